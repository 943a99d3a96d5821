//! Contracts of the external collaborators the executors consume.
//!
//! Channel, schedule and content stores live outside this crate; the
//! in-memory implementations in `lineup-sim` are used for tests and
//! development.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::ResolverError;
use crate::model::{Channel, ChannelId, EquivalentSchedule, Interval, Item, ItemId, Publisher, Schedule};
use crate::query::{PrecedenceConfig, ScheduleWindow};

/// Resources found for a lookup; may hold fewer than were requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    resources: Vec<T>,
}

impl<T> Resolved<T> {
    pub fn new(resources: Vec<T>) -> Self {
        Self { resources }
    }

    pub fn empty() -> Self {
        Self {
            resources: Vec::new(),
        }
    }

    pub fn resources(&self) -> &[T] {
        &self.resources
    }

    pub fn into_resources(self) -> Vec<T> {
        self.resources
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Merged equivalents keyed by the id they were requested under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEquivalents {
    merged: HashMap<ItemId, Vec<Item>>,
}

impl ResolvedEquivalents {
    pub fn new(merged: HashMap<ItemId, Vec<Item>>) -> Self {
        Self { merged }
    }

    /// Merged items for `id`; empty when the id was not resolved.
    pub fn get(&self, id: ItemId) -> &[Item] {
        self.merged.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Resolves channel ids to channels.
#[async_trait]
pub trait ChannelResolver: Send + Sync + std::fmt::Debug {
    /// Looks up `ids`; unknown ids are silently absent from the result.
    ///
    /// # Errors
    /// - `ResolverError::Unavailable` - Backing store could not be reached
    async fn resolve_ids(&self, ids: &[ChannelId]) -> Result<Resolved<Channel>, ResolverError>;
}

/// Plain schedule lookup for a single publisher.
///
/// Only end-bounded windows exist on this path; count-bounded queries are
/// rejected by the executor before reaching it.
#[async_trait]
pub trait ScheduleResolver: Send + Sync + std::fmt::Debug {
    /// Resolves `publisher`'s schedule for `channels` over `interval`.
    ///
    /// # Errors
    /// - `ResolverError::Unavailable` - Backing store could not be reached
    async fn resolve(
        &self,
        channels: &[Channel],
        interval: Interval,
        publisher: &Publisher,
    ) -> Result<Schedule, ResolverError>;
}

/// Equivalence-aware schedule lookup.
#[async_trait]
pub trait EquivalentScheduleResolver: Send + Sync + std::fmt::Debug {
    /// Resolves `publisher`'s schedule with each entry's equivalent items
    /// drawn from `selected_sources`.
    ///
    /// # Errors
    /// - `ResolverError::Unavailable` - Backing store could not be reached
    async fn resolve_schedules(
        &self,
        channels: &[Channel],
        window: ScheduleWindow,
        publisher: &Publisher,
        selected_sources: &[Publisher],
    ) -> Result<EquivalentSchedule, ResolverError>;
}

/// Resolves content ids to their merged equivalents.
#[async_trait]
pub trait MergingEquivalentsResolver: Send + Sync + std::fmt::Debug {
    /// Resolves and merges the equivalence sets of `ids`.
    ///
    /// # Errors
    /// - `ResolverError::Unavailable` - Backing store could not be reached
    async fn resolve_ids(
        &self,
        ids: &[ItemId],
        sources: &PrecedenceConfig,
    ) -> Result<ResolvedEquivalents, ResolverError>;
}
