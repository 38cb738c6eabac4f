//! Parser for version expressions.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ExprErrorKind;
use crate::version::VersionTuple;
use crate::{Error, Result};

/// Expression used when a marker carries no argument.
pub const DEFAULT_EXPRESSION: &str = "only";

/// Whether a predicate restricts a test to a flavor or excludes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Qualifier {
    /// Run only on the named flavor.
    Only,
    /// Don't run on the named flavor.
    Skip,
}

/// Comparison operators for the version boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
}

/// A parsed expression: qualifier plus an optional comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    pub qualifier: Qualifier,
    /// Operator and boundary; `None` matches any version.
    pub comparison: Option<(Operator, VersionTuple)>,
}

impl Predicate {
    /// Predicate with no version comparison.
    pub fn new(qualifier: Qualifier) -> Self {
        Self {
            qualifier,
            comparison: None,
        }
    }

    /// Predicate comparing against `boundary` with `op`.
    pub fn with_comparison(qualifier: Qualifier, op: Operator, boundary: VersionTuple) -> Self {
        Self {
            qualifier,
            comparison: Some((op, boundary)),
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        self.comparison.as_ref().map(|(op, _)| *op)
    }

    pub fn boundary(&self) -> Option<&VersionTuple> {
        self.comparison.as_ref().map(|(_, v)| v)
    }

    /// Whether `actual` satisfies the comparison.
    ///
    /// Always true without a comparison. `None` when a comparison is needed
    /// but the actual version is unknown.
    pub fn version_matches(&self, actual: Option<&VersionTuple>) -> Option<bool> {
        match (&self.comparison, actual) {
            (None, _) => Some(true),
            (Some((op, boundary)), Some(actual)) => Some(op.matches(actual, boundary)),
            (Some(_), None) => None,
        }
    }
}

impl Default for Predicate {
    #[inline]
    fn default() -> Self {
        Self::new(Qualifier::Only)
    }
}

/// Parse a version expression into a predicate.
///
/// An empty expression is the same as [`DEFAULT_EXPRESSION`].
pub fn parse_expression(input: &str) -> Result<Predicate> {
    let expr = input.trim();
    if expr.is_empty() {
        return Ok(Predicate::default());
    }

    let malformed = |kind| Error::malformed(input, kind);

    let (qualifier, rest) = parse_qualifier(expr).map_err(malformed)?;
    let rest = rest.trim_start();
    if rest.is_empty() {
        return Ok(Predicate::new(qualifier));
    }

    let (op, rest) = parse_operator(rest).map_err(malformed)?;
    let boundary: VersionTuple = rest.trim().parse().map_err(malformed)?;

    Ok(Predicate::with_comparison(qualifier, op, boundary))
}

/// Split off the leading qualifier word.
fn parse_qualifier(input: &str) -> std::result::Result<(Qualifier, &str), ExprErrorKind> {
    let end = input
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(input.len());

    if end == 0 {
        return Err(ExprErrorKind::MissingQualifier);
    }

    let qualifier = match &input[..end] {
        "only" => Qualifier::Only,
        "skip" => Qualifier::Skip,
        other => return Err(ExprErrorKind::UnknownQualifier(other.to_string())),
    };

    Ok((qualifier, &input[end..]))
}

/// Split off a comparison operator.
fn parse_operator(input: &str) -> std::result::Result<(Operator, &str), ExprErrorKind> {
    // Order matters: check 2-char ops before 1-char
    let (op, op_len) = if input.starts_with(">=") {
        (Operator::Ge, 2)
    } else if input.starts_with("<=") {
        (Operator::Le, 2)
    } else if input.starts_with("==") {
        (Operator::Eq, 2)
    } else if input.starts_with("!=") {
        (Operator::Ne, 2)
    } else if input.starts_with('>') {
        (Operator::Gt, 1)
    } else if input.starts_with('<') {
        (Operator::Lt, 1)
    } else {
        return Err(ExprErrorKind::UnknownOperator(input.to_string()));
    };

    Ok((op, &input[op_len..]))
}

impl Operator {
    /// Apply the operator as `actual <op> boundary`.
    pub fn matches(self, actual: &VersionTuple, boundary: &VersionTuple) -> bool {
        match self {
            Operator::Lt => actual < boundary,
            Operator::Le => actual <= boundary,
            Operator::Gt => actual > boundary,
            Operator::Ge => actual >= boundary,
            Operator::Eq => actual == boundary,
            Operator::Ne => actual != boundary,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Eq => "==",
            Operator::Ne => "!=",
        }
    }
}

impl FromStr for Predicate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_expression(s)
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::Only => write!(f, "only"),
            Qualifier::Skip => write!(f, "skip"),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualifier)?;
        if let Some((op, boundary)) = &self.comparison {
            write!(f, " {} {}", op, boundary)?;
        }
        Ok(())
    }
}
