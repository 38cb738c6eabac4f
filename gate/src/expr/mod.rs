//! Version expression micro-language.
//!
//! # Syntax Overview
//!
//! Full pattern: `qualifier [operator version]`
//!
//! - **Qualifier**: `only` (run only on the named flavor) or `skip`
//!   (don't run on the named flavor)
//! - **Operator**: `<`, `<=`, `>`, `>=`, `==`, `!=`
//! - **Version**: dotted integers, `22`, `21.2`, `21.2.10`
//!
//! The empty expression means `only`. Whitespace between tokens is ignored.

mod parser;

pub use parser::{parse_expression, Operator, Predicate, Qualifier, DEFAULT_EXPRESSION};
