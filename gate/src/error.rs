//! Error types for gate operations.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Malformed version expression {expr:?}: {kind}")]
    MalformedExpression { expr: String, kind: ExprErrorKind },

    #[error("Marker misuse: {0}")]
    MarkerMisuse(String),
}

/// What exactly was wrong with a version expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprErrorKind {
    #[error("expected 'only' or 'skip' at the start")]
    MissingQualifier,

    #[error("unknown qualifier '{0}', expected 'only' or 'skip'")]
    UnknownQualifier(String),

    #[error("unknown operator at '{0}', expected one of <, <=, >, >=, ==, !=")]
    UnknownOperator(String),

    #[error("missing version after operator")]
    MissingVersion,

    #[error("invalid version literal '{0}'")]
    InvalidVersion(String),
}

impl Error {
    pub(crate) fn malformed(expr: &str, kind: ExprErrorKind) -> Self {
        Error::MalformedExpression {
            expr: expr.to_string(),
            kind,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
