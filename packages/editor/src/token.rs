//! Per-document optimistic concurrency token.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque version stamp of a document.
///
/// Compared for equality only. A fresh token is minted on every successful
/// mutation, so a client presenting an older token is detected as stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeToken(String);

impl ChangeToken {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ChangeToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ChangeToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
