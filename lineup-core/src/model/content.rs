//! Playable content items and their pairing with schedule slots.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Broadcast, Publisher};

/// Publisher-scoped content identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Playable unit (episode, film, ...) carrying its broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub publisher: Publisher,
    pub title: String,
    #[serde(default)]
    pub broadcasts: Vec<Broadcast>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, publisher: Publisher, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            publisher,
            title: title.into(),
            broadcasts: Vec::new(),
        }
    }

    /// Adds a broadcast of this item.
    pub fn with_broadcast(mut self, broadcast: Broadcast) -> Self {
        self.broadcasts.push(broadcast);
        self
    }

    /// Checks whether this item airs in exactly the slot of `broadcast`.
    pub fn has_broadcast(&self, broadcast: &Broadcast) -> bool {
        self.broadcasts.iter().any(|own| own.same_slot(broadcast))
    }
}

/// One item paired with the broadcast occupying a schedule slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAndBroadcast {
    pub item: Item,
    pub broadcast: Broadcast,
}

impl ItemAndBroadcast {
    pub fn new(item: Item, broadcast: Broadcast) -> Self {
        Self { item, broadcast }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.broadcast.transmission_time
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.broadcast.transmission_end_time
    }

    /// Copy of this entry with its broadcast re-timed to `[start, end)`.
    pub(crate) fn retimed(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            item: self.item.clone(),
            broadcast: self.broadcast.retimed(start, end),
        }
    }

    /// Schedule ordering of the entries' broadcasts.
    pub fn cmp_transmission(&self, other: &Self) -> Ordering {
        self.broadcast.cmp_transmission(&other.broadcast)
    }
}
