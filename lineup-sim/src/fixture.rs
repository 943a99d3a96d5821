//! JSON catalogue format for simulated schedules.
//!
//! ```json
//! {
//!   "channels": [{ "id": 1, "key": "bbcone", "title": "BBC One" }],
//!   "items": [{
//!     "id": 10, "publisher": "pressassociation.com", "title": "News",
//!     "broadcasts": [{
//!       "channel_id": 1,
//!       "transmission_time": "2024-03-01T09:00:00Z",
//!       "transmission_end_time": "2024-03-01T10:00:00Z"
//!     }]
//!   }],
//!   "equivalences": [[10, 11]]
//! }
//! ```

use std::path::{Path, PathBuf};

use lineup_core::model::{Channel, Item, ItemId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Cannot read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed fixture: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Equivalence set references unknown item {item_id}")]
    UnknownItem { item_id: ItemId },

    #[error("Item {item_id} has a broadcast ending before it starts")]
    InvertedBroadcast { item_id: ItemId },
}

/// Channels, scheduled items and cross-publisher equivalence sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleFixture {
    #[serde(default)]
    pub channels: Vec<Channel>,
    /// Items with the broadcasts that place them in schedules
    #[serde(default)]
    pub items: Vec<Item>,
    /// Groups of item ids representing the same work
    #[serde(default)]
    pub equivalences: Vec<Vec<ItemId>>,
}

impl ScheduleFixture {
    /// Parses and validates a fixture.
    ///
    /// # Errors
    /// - `FixtureError::Parse` - Not valid fixture JSON
    /// - `FixtureError::UnknownItem` - Equivalence set names a missing item
    /// - `FixtureError::InvertedBroadcast` - A broadcast ends before it starts
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        let fixture: Self = serde_json::from_str(json)?;
        fixture.validate()?;
        Ok(fixture)
    }

    /// Reads a fixture file.
    ///
    /// # Errors
    /// - `FixtureError::Io` - File cannot be read
    /// - `FixtureError::Parse` - Not valid fixture JSON
    /// - `FixtureError::UnknownItem` - Equivalence set names a missing item
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Serializes the fixture as pretty-printed JSON.
    ///
    /// # Errors
    /// - `FixtureError::Parse` - Serialization failed
    pub fn to_json(&self) -> Result<String, FixtureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), FixtureError> {
        for item in &self.items {
            if item
                .broadcasts
                .iter()
                .any(|b| b.transmission_end_time < b.transmission_time)
            {
                return Err(FixtureError::InvertedBroadcast { item_id: item.id });
            }
        }
        for item_id in self.equivalences.iter().flatten() {
            if !self.items.iter().any(|item| item.id == *item_id) {
                return Err(FixtureError::UnknownItem { item_id: *item_id });
            }
        }
        Ok(())
    }
}
