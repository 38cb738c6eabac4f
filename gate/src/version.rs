//! Dotted numeric versions with zero-padded comparison.
//!
//! `21.2` and `21.2.0` compare equal: the shorter tuple is padded with
//! trailing zeros before comparing component by component.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::ExprErrorKind;

/// A version such as `21.2.10`, stored as its numeric components.
#[derive(Debug, Clone)]
pub struct VersionTuple {
    parts: Vec<u32>,
}

impl VersionTuple {
    /// Build a version from its components. Returns `None` for an empty slice.
    pub fn new(parts: impl Into<Vec<u32>>) -> Option<Self> {
        let parts = parts.into();
        if parts.is_empty() {
            None
        } else {
            Some(Self { parts })
        }
    }

    /// Decode the numeric form `MAJOR * 10000 + MINOR * 100 + PATCH`.
    ///
    /// `220103` becomes `22.1.3`.
    pub fn from_server_num(num: u32) -> Self {
        Self {
            parts: vec![num / 10_000, (num / 100) % 100, num % 100],
        }
    }

    /// Leniently extract a version from what a server reports.
    ///
    /// Takes the first dotted-numeric run in the string, so `v22.1.3`,
    /// `22.1.3-beta.1` and `CockroachDB CCL v22.1.3 (x86_64...)` all give
    /// `22.1.3`. The run stops at the first component that isn't a usable
    /// number (`22..1` gives `22`). Returns `None` when the string holds no
    /// number at all.
    pub fn from_reported(reported: &str) -> Option<Self> {
        let start = reported.find(|c: char| c.is_ascii_digit())?;
        let rest = &reported[start..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());

        let parts: Vec<u32> = rest[..end]
            .split('.')
            .map_while(|part| part.parse().ok())
            .collect();
        Self::new(parts)
    }

    /// The components as written.
    pub fn parts(&self) -> &[u32] {
        &self.parts
    }

    fn component(&self, i: usize) -> u32 {
        self.parts.get(i).copied().unwrap_or(0)
    }
}

impl FromStr for VersionTuple {
    type Err = ExprErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ExprErrorKind::InvalidVersion(s.to_string());

        if s.is_empty() {
            return Err(ExprErrorKind::MissingVersion);
        }

        let parts = s
            .split('.')
            .map(|part| {
                // u32::from_str accepts a leading '+', which is not a version digit
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                part.parse::<u32>().map_err(|_| invalid())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { parts })
    }
}

impl Ord for VersionTuple {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for VersionTuple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionTuple {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionTuple {}

impl fmt::Display for VersionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

impl Serialize for VersionTuple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
