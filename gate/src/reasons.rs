//! Known skip reasons and the tracker issues they link to.
//!
//! A reason keyword found in the table is rendered with an issue URL, e.g.
//! `encoding (https://github.com/cockroachdb/cockroach/issues/35882)`.
//! Unknown keywords are shown as they are.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

/// Issue tracker base URL; the issue number is appended to it.
pub const DEFAULT_ISSUE_URL_BASE: &str = "https://github.com/cockroachdb/cockroach/issues/";

/// Builtin keyword -> issue number table.
static BUILTIN_REASONS: LazyLock<HashMap<&'static str, u32>> = LazyLock::new(|| {
    HashMap::from([
        ("2-phase commit", 22329),
        ("backend pid", 35897),
        ("batch statements", 44803),
        ("binary decimal", 82492),
        ("cancel", 41335),
        ("cast adds tz", 51692),
        ("cidr", 18846),
        ("composite", 27792),
        ("copy canceled", 81559),
        ("copy", 41608),
        ("cursor with hold", 77101),
        ("deferrable", 48307),
        ("do", 17511),
        ("encoding", 35882),
        ("geometric types", 21286),
        ("hstore", 41284),
        ("infinity date", 41564),
        ("interval style", 35807),
        ("json array", 23468),
        ("large objects", 243),
        ("negative interval", 81577),
        ("nested array", 32552),
        ("notify", 41522),
        ("password_encryption", 42519),
        ("pg_terminate_backend", 35897),
        ("range", 41282),
        ("severity_nonlocalized", 81794),
        ("scroll cursor", 77102),
        ("server-side cursor", 41412),
        ("stored procedure", 1751),
    ])
});

/// Reason lookup: the builtin table plus entries added from configuration.
#[derive(Debug, Clone)]
pub struct ReasonRegistry {
    issue_url_base: String,
    /// Overrides builtin entries with the same keyword.
    extra: HashMap<String, u32>,
}

impl Default for ReasonRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReasonRegistry {
    /// Registry holding only the builtin reasons.
    pub fn builtin() -> Self {
        Self {
            issue_url_base: DEFAULT_ISSUE_URL_BASE.to_string(),
            extra: HashMap::new(),
        }
    }

    /// Use a different issue tracker base URL.
    pub fn with_issue_url_base(mut self, base: impl Into<String>) -> Self {
        self.issue_url_base = base.into();
        self
    }

    /// Add (or override) reason entries.
    pub fn with_reasons<I, K>(mut self, reasons: I) -> Self
    where
        I: IntoIterator<Item = (K, u32)>,
        K: Into<String>,
    {
        self.extra.extend(reasons.into_iter().map(|(k, n)| (k.into(), n)));
        self
    }

    /// Issue number for a keyword. Exact, case-sensitive match.
    pub fn issue(&self, reason: &str) -> Option<u32> {
        self.extra
            .get(reason)
            .or_else(|| BUILTIN_REASONS.get(reason))
            .copied()
    }

    /// Issue URL for a keyword, if it is known.
    pub fn issue_url(&self, reason: &str) -> Option<String> {
        self.issue(reason).map(|number| format!("{}{}", self.issue_url_base, number))
    }

    /// Render a reason for a skip message.
    ///
    /// `None` or empty gives an empty string; a known keyword gets its issue
    /// URL appended in parentheses; anything else is returned unchanged.
    pub fn enrich(&self, reason: Option<&str>) -> String {
        match reason {
            None | Some("") => String::new(),
            Some(reason) => match self.issue_url(reason) {
                Some(url) => format!("{} ({})", reason, url),
                None => reason.to_string(),
            },
        }
    }

    /// All entries, sorted by keyword.
    pub fn entries(&self) -> Vec<(String, u32)> {
        let mut merged: BTreeMap<String, u32> = BUILTIN_REASONS
            .iter()
            .map(|(k, n)| (k.to_string(), *n))
            .collect();
        merged.extend(self.extra.iter().map(|(k, n)| (k.clone(), *n)));
        merged.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrich_known_reason() {
        let registry = ReasonRegistry::builtin();
        let msg = registry.enrich(Some("encoding"));
        assert!(msg.contains("35882"));
        assert_eq!(msg, "encoding (https://github.com/cockroachdb/cockroach/issues/35882)");
    }

    #[test]
    fn test_enrich_unknown_reason() {
        let registry = ReasonRegistry::builtin();
        assert_eq!(registry.enrich(Some("not-a-real-reason")), "not-a-real-reason");
    }

    #[test]
    fn test_enrich_empty() {
        let registry = ReasonRegistry::builtin();
        assert_eq!(registry.enrich(None), "");
        assert_eq!(registry.enrich(Some("")), "");
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = ReasonRegistry::builtin();
        assert_eq!(registry.issue("encoding"), Some(35882));
        assert_eq!(registry.issue("Encoding"), None);
        assert_eq!(registry.issue("encoding "), None);
    }

    #[test]
    fn test_issue_url() {
        let registry = ReasonRegistry::builtin();
        assert_eq!(
            registry.issue_url("large objects").as_deref(),
            Some("https://github.com/cockroachdb/cockroach/issues/243")
        );
        assert!(registry.issue_url("nope").is_none());
    }

    #[test]
    fn test_extra_reasons_override_builtin() {
        let registry = ReasonRegistry::builtin()
            .with_issue_url_base("https://tracker.example/i/")
            .with_reasons([("encoding", 1), ("my feature", 42)]);
        assert_eq!(registry.enrich(Some("encoding")), "encoding (https://tracker.example/i/1)");
        assert_eq!(
            registry.enrich(Some("my feature")),
            "my feature (https://tracker.example/i/42)"
        );
        assert_eq!(registry.issue("cidr"), Some(18846));
    }

    #[test]
    fn test_entries_sorted_and_merged() {
        let registry = ReasonRegistry::builtin().with_reasons([("zzz", 7)]);
        let entries = registry.entries();
        assert_eq!(entries.len(), 31);
        assert_eq!(entries.first().map(|(k, _)| k.as_str()), Some("2-phase commit"));
        assert_eq!(entries.last(), Some(&("zzz".to_string(), 7)));
    }
}
