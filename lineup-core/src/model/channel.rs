//! Broadcast channels.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Publisher;

/// Opaque channel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(u64);

impl ChannelId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChannelId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Channel resolved by a [`ChannelResolver`](crate::resolver::ChannelResolver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    /// Stable human readable key, e.g. `"bbcone"`
    pub key: String,
    pub title: String,
    /// Publishers that carry schedule data for this channel
    #[serde(default)]
    pub available_from: Vec<Publisher>,
}

impl Channel {
    pub fn new(id: impl Into<ChannelId>, key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            id: id.into(),
            title: key.clone(),
            key,
            available_from: Vec::new(),
        }
    }

    /// Sets the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Adds a publisher that provides schedule data for this channel.
    pub fn available_from(mut self, publisher: Publisher) -> Self {
        self.available_from.push(publisher);
        self
    }
}
