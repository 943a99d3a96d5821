//! Content publishers (schedule and metadata sources).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Publisher key such as `"bbc.co.uk"` or `"pressassociation.com"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Publisher(String);

impl Publisher {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Publisher {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}
