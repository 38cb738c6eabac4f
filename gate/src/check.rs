//! Evaluating a version expression against the server under test.

use serde::Serialize;

use crate::expr::{parse_expression, Predicate, Qualifier};
use crate::version::VersionTuple;
use crate::Result;

/// Flavor name used when none is configured.
pub const DEFAULT_FLAVOR: &str = "CockroachDB";

/// Whether a comparison counts as matching when the server is the named
/// flavor but its version could not be determined.
///
/// With `true`, `only <op> V` tests run and `skip <op> V` tests are skipped
/// on such a server.
pub const UNKNOWN_VERSION_MATCHES: bool = true;

/// Source of the facts a check needs about the connected server.
pub trait FlavorProbe {
    /// Is the active server the named flavor?
    fn is_flavor(&self) -> bool;

    /// The version string the server reports, if any.
    fn server_version(&self) -> Option<String>;
}

/// What is known about the server a test would run against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    pub is_flavor: bool,
    pub version: Option<VersionTuple>,
}

impl ServerInfo {
    /// A server of the named flavor.
    pub fn flavor(version: Option<VersionTuple>) -> Self {
        Self {
            is_flavor: true,
            version,
        }
    }

    /// A server of the reference implementation.
    pub fn reference(version: Option<VersionTuple>) -> Self {
        Self {
            is_flavor: false,
            version,
        }
    }

    /// Ask a probe about the server. An unparseable version becomes `None`.
    pub fn probe(probe: &impl FlavorProbe) -> Self {
        let reported = probe.server_version();
        let version = reported.as_deref().and_then(VersionTuple::from_reported);
        if version.is_none() {
            if let Some(reported) = &reported {
                log::debug!("could not parse server version {:?}", reported);
            }
        }
        Self {
            is_flavor: probe.is_flavor(),
            version,
        }
    }
}

/// A predicate bound to the flavor it talks about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCheck {
    pub predicate: Predicate,
    /// Flavor name used in messages, e.g. "CockroachDB".
    pub whose: String,
}

impl VersionCheck {
    /// Parse an expression; `whose` defaults to [`DEFAULT_FLAVOR`].
    pub fn parse(expr: &str) -> Result<Self> {
        Ok(Self::new(parse_expression(expr)?))
    }

    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            whose: DEFAULT_FLAVOR.to_string(),
        }
    }

    pub fn with_whose(mut self, whose: impl Into<String>) -> Self {
        self.whose = whose.into();
        self
    }

    /// Decide whether the test should be skipped on `server`.
    ///
    /// Returns the skip message, or `None` to run the test.
    pub fn get_skip_message(&self, server: &ServerInfo) -> Option<String> {
        let msg = match self.predicate.qualifier {
            Qualifier::Only => {
                if !server.is_flavor {
                    Some(format!("only for {}", self.describe()))
                } else if !self.version_matches(server) {
                    Some(self.mismatch())
                } else {
                    None
                }
            }
            Qualifier::Skip => {
                if server.is_flavor && self.version_matches(server) {
                    Some(format!("skip on {}", self.describe()))
                } else {
                    None
                }
            }
        };

        log::debug!(
            "{} on {:?}: {}",
            self.predicate,
            server,
            msg.as_deref().unwrap_or("run")
        );
        msg
    }

    fn version_matches(&self, server: &ServerInfo) -> bool {
        self.predicate
            .version_matches(server.version.as_ref())
            .unwrap_or_else(|| {
                log::warn!(
                    "{} version unknown, treating '{}' as {}",
                    self.whose,
                    self.predicate,
                    if UNKNOWN_VERSION_MATCHES { "matching" } else { "not matching" }
                );
                UNKNOWN_VERSION_MATCHES
            })
    }

    /// `<whose> version mismatch: need <op> <boundary>`.
    fn mismatch(&self) -> String {
        match &self.predicate.comparison {
            Some((op, boundary)) => {
                format!("{} version mismatch: need {} {}", self.whose, op, boundary)
            }
            None => format!("{} version mismatch", self.whose),
        }
    }

    /// `<whose>` or `<whose> <op> <boundary>`.
    fn describe(&self) -> String {
        match &self.predicate.comparison {
            Some((op, boundary)) => format!("{} {} {}", self.whose, op, boundary),
            None => self.whose.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Option<VersionTuple> {
        Some(s.parse().unwrap())
    }

    fn check(expr: &str) -> VersionCheck {
        VersionCheck::parse(expr).unwrap()
    }

    #[test]
    fn test_only_on_reference_skips() {
        let c = check("only");
        assert_eq!(
            c.get_skip_message(&ServerInfo::reference(v("15.4"))).as_deref(),
            Some("only for CockroachDB")
        );
    }

    #[test]
    fn test_only_with_version_on_reference_always_skips() {
        let c = check("only >= 21.1");
        for version in [None, v("10"), v("21.1"), v("99")] {
            let msg = c.get_skip_message(&ServerInfo::reference(version));
            assert_eq!(msg.as_deref(), Some("only for CockroachDB >= 21.1"));
        }
    }

    #[test]
    fn test_only_on_flavor_version_mismatch() {
        let c = check("only >= 21.1");
        assert_eq!(
            c.get_skip_message(&ServerInfo::flavor(v("20.2.9"))).as_deref(),
            Some("CockroachDB version mismatch: need >= 21.1")
        );
    }

    #[test]
    fn test_wrong_flavor_and_wrong_version_differ() {
        let c = check("only >= 21.1");
        let wrong_flavor = c.get_skip_message(&ServerInfo::reference(v("21.2")));
        let wrong_version = c.get_skip_message(&ServerInfo::flavor(v("20.2")));
        assert!(wrong_flavor.is_some());
        assert!(wrong_version.is_some());
        assert_ne!(wrong_flavor, wrong_version);
    }

    #[test]
    fn test_only_on_flavor_version_match_runs() {
        let c = check("only >= 21.1");
        assert_eq!(c.get_skip_message(&ServerInfo::flavor(v("21.1"))), None);
        assert_eq!(c.get_skip_message(&ServerInfo::flavor(v("22.2.3"))), None);
        assert_eq!(check("only").get_skip_message(&ServerInfo::flavor(None)), None);
    }

    #[test]
    fn test_skip_on_reference_runs() {
        assert_eq!(check("skip").get_skip_message(&ServerInfo::reference(v("15"))), None);
        assert_eq!(check("skip < 22").get_skip_message(&ServerInfo::reference(v("15"))), None);
    }

    #[test]
    fn test_skip_below_version() {
        let c = check("skip < 22");
        assert_eq!(
            c.get_skip_message(&ServerInfo::flavor(v("21.9"))).as_deref(),
            Some("skip on CockroachDB < 22")
        );
        assert_eq!(c.get_skip_message(&ServerInfo::flavor(v("22.0"))), None);
    }

    #[test]
    fn test_bare_skip_on_flavor() {
        assert_eq!(
            check("skip").get_skip_message(&ServerInfo::flavor(v("23.1"))).as_deref(),
            Some("skip on CockroachDB")
        );
    }

    #[test]
    fn test_equality_uses_padding() {
        let c = check("skip == 21.2");
        assert!(c.get_skip_message(&ServerInfo::flavor(v("21.2.0"))).is_some());
        assert!(c.get_skip_message(&ServerInfo::flavor(v("21.2.1"))).is_none());
    }

    #[test]
    fn test_unknown_version_counts_as_match() {
        let unknown = ServerInfo::flavor(None);
        assert_eq!(check("only >= 21.1").get_skip_message(&unknown), None);
        assert_eq!(
            check("skip < 22").get_skip_message(&unknown).as_deref(),
            Some("skip on CockroachDB < 22")
        );
    }

    #[test]
    fn test_whose_in_message() {
        let c = check("skip").with_whose("YugabyteDB");
        assert_eq!(
            c.get_skip_message(&ServerInfo::flavor(v("2.19"))).as_deref(),
            Some("skip on YugabyteDB")
        );
    }

    struct FakeProbe {
        crdb: bool,
        version: Option<&'static str>,
    }

    impl FlavorProbe for FakeProbe {
        fn is_flavor(&self) -> bool {
            self.crdb
        }

        fn server_version(&self) -> Option<String> {
            self.version.map(str::to_string)
        }
    }

    #[test]
    fn test_probe() {
        let info = ServerInfo::probe(&FakeProbe {
            crdb: true,
            version: Some("v22.1.3"),
        });
        assert_eq!(info, ServerInfo::flavor(v("22.1.3")));

        let info = ServerInfo::probe(&FakeProbe {
            crdb: false,
            version: Some("garbage"),
        });
        assert_eq!(info, ServerInfo::reference(None));
    }
}
