//! Identifiers used throughout GridMatch.
//!
//! Meter accounts are keyed by an opaque, caller-chosen string. Ordering on
//! [`AccountId`] is plain lexicographic byte order and serves as the
//! deterministic tie-break during clearing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of an enrolled meter account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_lexicographic() {
        let mut ids = vec![
            AccountId::from("meter-b"),
            AccountId::from("meter-a"),
            AccountId::from("meter-10"),
        ];
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(AccountId::as_str).collect();
        assert_eq!(sorted, ["meter-10", "meter-a", "meter-b"]);
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = AccountId::from("m-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"m-42\"");
    }
}
