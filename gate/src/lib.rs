//! gate: version-gated test selection
//!
//! Decides whether a test runs or is skipped depending on the flavor
//! (PostgreSQL or CockroachDB) and version of the server under test.

pub mod check;
pub mod config;
pub mod error;
pub mod expr;
pub mod marker;
pub mod reasons;
pub mod version;

pub use check::{FlavorProbe, ServerInfo, VersionCheck, DEFAULT_FLAVOR, UNKNOWN_VERSION_MATCHES};
pub use config::Config;
pub use error::{Error, ExprErrorKind, Result};
pub use expr::{parse_expression, Operator, Predicate, Qualifier, DEFAULT_EXPRESSION};
pub use marker::{Marker, MarkerBinding, SkipAction, MARKER_HELP, MARKER_NAME};
pub use reasons::{ReasonRegistry, DEFAULT_ISSUE_URL_BASE};
pub use version::VersionTuple;
