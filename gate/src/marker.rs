//! Binding between a test runner's `crdb` marker and [`VersionCheck`].
//!
//! Usage from a runner:
//!
//! ```text
//! crdb                   run on CockroachDB only, any version
//! crdb("only >= 21.1")   run on CockroachDB >= 21.1 only (not on PostgreSQL)
//! crdb("skip")           don't run on CockroachDB, any version
//! crdb("skip < 22")      don't run on CockroachDB < 22 (run on PostgreSQL)
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::check::{ServerInfo, VersionCheck, DEFAULT_FLAVOR};
use crate::expr::DEFAULT_EXPRESSION;
use crate::reasons::ReasonRegistry;
use crate::{Config, Error, Result};

/// Name under which runners register the marker.
pub const MARKER_NAME: &str = "crdb";

/// Registration line for runners that describe their markers.
pub const MARKER_HELP: &str = "crdb(version_expr, reason=detail): run/skip the test with matching \
     CockroachDB (e.g. 'only >= 21.2.10', 'only < 22.1', 'skip < 22')";

/// The only keyword argument the marker accepts.
const REASON_KEY: &str = "reason";

/// A marker as attached to a test item: positional and keyword arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marker {
    pub args: Vec<String>,
    pub kwargs: BTreeMap<String, String>,
}

impl Marker {
    /// Marker without arguments (`only`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Marker with a single expression argument.
    pub fn expr(expr: impl Into<String>) -> Self {
        Self::new().arg(expr)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    pub fn reason(self, reason: impl Into<String>) -> Self {
        self.kwarg(REASON_KEY, reason)
    }

    /// Run only on the named flavor.
    pub fn only() -> Self {
        Self::expr("only")
    }

    /// Don't run on the named flavor, optionally saying why.
    pub fn skip(reason: Option<&str>) -> Self {
        let marker = Self::expr("skip");
        match reason {
            Some(reason) => marker.reason(reason),
            None => marker,
        }
    }

    /// Fails on the flavor because of missing encodings.
    pub fn encoding() -> Self {
        Self::skip(Some("encoding"))
    }

    /// Fails on the flavor because time types don't support precision.
    pub fn time_precision() -> Self {
        Self::skip(Some("time precision"))
    }

    /// Fails on the flavor because standard_conforming_strings can't be off.
    pub fn scs_off() -> Self {
        Self::skip(Some("standard_conforming_strings=off"))
    }

    /// Reject argument shapes the marker doesn't support.
    fn validate(&self) -> Result<()> {
        if self.args.len() > 1 {
            return Err(Error::MarkerMisuse(format!(
                "{} takes at most one positional argument, got {}",
                MARKER_NAME,
                self.args.len()
            )));
        }
        if let Some(key) = self.kwargs.keys().find(|k| k.as_str() != REASON_KEY) {
            return Err(Error::MarkerMisuse(format!(
                "{} got an unexpected keyword argument '{}'",
                MARKER_NAME, key
            )));
        }
        Ok(())
    }
}

/// What the runner should do with a test item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "message", rename_all = "lowercase")]
pub enum SkipAction {
    /// Let the test run.
    Proceed,
    /// Skip the test with this message.
    Skip(String),
}

impl SkipAction {
    pub fn is_skip(&self) -> bool {
        matches!(self, SkipAction::Skip(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            SkipAction::Proceed => None,
            SkipAction::Skip(msg) => Some(msg),
        }
    }
}

/// Turns markers into skip decisions for one flavor.
#[derive(Debug, Clone)]
pub struct MarkerBinding {
    whose: String,
    registry: ReasonRegistry,
}

impl Default for MarkerBinding {
    fn default() -> Self {
        Self::new(DEFAULT_FLAVOR, ReasonRegistry::builtin())
    }
}

impl MarkerBinding {
    pub fn new(whose: impl Into<String>, registry: ReasonRegistry) -> Self {
        Self {
            whose: whose.into(),
            registry,
        }
    }

    /// Binding with the flavor name and reasons from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.flavor.clone(), config.reason_registry())
    }

    pub fn whose(&self) -> &str {
        &self.whose
    }

    pub fn registry(&self) -> &ReasonRegistry {
        &self.registry
    }

    /// Build the check a marker describes, without evaluating it.
    pub fn version_check(&self, marker: &Marker) -> Result<VersionCheck> {
        marker.validate()?;
        let expr = marker.args.first().map(String::as_str).unwrap_or(DEFAULT_EXPRESSION);
        Ok(VersionCheck::parse(expr)?.with_whose(self.whose.clone()))
    }

    /// Decide what to do with a test carrying `marker` on `server`.
    pub fn check(&self, marker: &Marker, server: &ServerInfo) -> Result<SkipAction> {
        let check = self.version_check(marker)?;

        let Some(mut msg) = check.get_skip_message(server) else {
            return Ok(SkipAction::Proceed);
        };

        let reason = self
            .registry
            .enrich(marker.kwargs.get(REASON_KEY).map(String::as_str));
        if !reason.is_empty() {
            msg = format!("{}: {}", msg, reason);
        }

        Ok(SkipAction::Skip(msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionTuple;

    fn crdb(version: &str) -> ServerInfo {
        ServerInfo::flavor(VersionTuple::from_reported(version))
    }

    fn postgres() -> ServerInfo {
        ServerInfo::reference(VersionTuple::from_reported("16.2"))
    }

    #[test]
    fn test_default_marker_is_only() {
        let binding = MarkerBinding::default();
        assert_eq!(binding.check(&Marker::new(), &crdb("23.1")).unwrap(), SkipAction::Proceed);
        assert_eq!(
            binding.check(&Marker::new(), &postgres()).unwrap(),
            SkipAction::Skip("only for CockroachDB".to_string())
        );
        assert_eq!(
            binding.version_check(&Marker::new()).unwrap(),
            binding.version_check(&Marker::only()).unwrap()
        );
    }

    #[test]
    fn test_skip_with_known_reason() {
        let binding = MarkerBinding::default();
        let action = binding.check(&Marker::encoding(), &crdb("23.1")).unwrap();
        assert_eq!(
            action.message(),
            Some("skip on CockroachDB: encoding (https://github.com/cockroachdb/cockroach/issues/35882)")
        );
    }

    #[test]
    fn test_skip_with_unknown_reason() {
        let binding = MarkerBinding::default();
        let marker = Marker::expr("skip < 22").reason("flaky here");
        let action = binding.check(&marker, &crdb("21.2.4")).unwrap();
        assert_eq!(action.message(), Some("skip on CockroachDB < 22: flaky here"));
    }

    #[test]
    fn test_reason_ignored_when_running() {
        let binding = MarkerBinding::default();
        assert_eq!(
            binding.check(&Marker::time_precision(), &postgres()).unwrap(),
            SkipAction::Proceed
        );
        assert_eq!(
            binding.check(&Marker::expr("skip < 22").reason("copy"), &crdb("22.1")).unwrap(),
            SkipAction::Proceed
        );
    }

    #[test]
    fn test_preset_reasons() {
        assert_eq!(
            Marker::scs_off().kwargs.get("reason").map(String::as_str),
            Some("standard_conforming_strings=off")
        );
        assert_eq!(Marker::skip(None).kwargs.len(), 0);
        assert_eq!(Marker::skip(None).args, vec!["skip".to_string()]);
    }

    #[test]
    fn test_two_positional_args_rejected() {
        let binding = MarkerBinding::default();
        let marker = Marker::expr("only").arg("skip");
        assert!(matches!(binding.check(&marker, &crdb("23.1")), Err(Error::MarkerMisuse(_))));
    }

    #[test]
    fn test_misuse_reported_before_parsing() {
        let binding = MarkerBinding::default();
        // The malformed expression is never looked at.
        let marker = Marker::expr("maybe").arg("also bad");
        assert!(matches!(binding.check(&marker, &crdb("23.1")), Err(Error::MarkerMisuse(_))));
    }

    #[test]
    fn test_unknown_keyword_rejected() {
        let binding = MarkerBinding::default();
        let marker = Marker::expr("skip").kwarg("because", "encoding");
        let err = binding.check(&marker, &crdb("23.1")).unwrap_err();
        assert!(err.to_string().contains("because"));
    }

    #[test]
    fn test_malformed_expression_propagates() {
        let binding = MarkerBinding::default();
        let marker = Marker::expr("maybe >= 1");
        assert!(matches!(
            binding.check(&marker, &crdb("23.1")),
            Err(Error::MalformedExpression { .. })
        ));
    }

    #[test]
    fn test_custom_flavor_and_registry() {
        let registry = ReasonRegistry::builtin()
            .with_issue_url_base("https://tracker.example/")
            .with_reasons([("sequences", 9)]);
        let binding = MarkerBinding::new("YugabyteDB", registry);
        let marker = Marker::skip(Some("sequences"));
        assert_eq!(
            binding.check(&marker, &ServerInfo::flavor(None)).unwrap().message(),
            Some("skip on YugabyteDB: sequences (https://tracker.example/9)")
        );
    }
}
