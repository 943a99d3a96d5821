//! Mock collaborators for executor tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::ResolverError;
use crate::model::{
    Channel, ChannelId, ChannelSchedule, EquivalentChannelSchedule, EquivalentSchedule, Interval,
    Item, ItemId, Publisher, Schedule,
};
use crate::query::{PrecedenceConfig, ScheduleWindow};
use crate::resolver::{
    ChannelResolver, EquivalentScheduleResolver, MergingEquivalentsResolver, Resolved,
    ResolvedEquivalents, ScheduleResolver,
};

/// Returns known channels in reverse of the requested order.
#[derive(Debug, Default)]
pub struct MockChannelResolver {
    channels: Vec<Channel>,
    delay: Duration,
}

impl MockChannelResolver {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self {
            channels,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ChannelResolver for MockChannelResolver {
    async fn resolve_ids(&self, ids: &[ChannelId]) -> Result<Resolved<Channel>, ResolverError> {
        tokio::time::sleep(self.delay).await;
        let found = ids
            .iter()
            .rev()
            .filter_map(|id| self.channels.iter().find(|c| c.id == *id).cloned())
            .collect();
        Ok(Resolved::new(found))
    }
}

/// Equivalence-aware schedules keyed by publisher.
#[derive(Debug, Default)]
pub struct MockEquivalentScheduleResolver {
    schedules: HashMap<Publisher, Vec<EquivalentChannelSchedule>>,
    delays: HashMap<Publisher, Duration>,
    /// `(publisher, selected sources)` of every call
    pub calls: Arc<Mutex<Vec<(Publisher, Vec<Publisher>)>>>,
}

impl MockEquivalentScheduleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(mut self, publisher: &str, schedule: EquivalentChannelSchedule) -> Self {
        self.schedules
            .entry(Publisher::new(publisher))
            .or_default()
            .push(schedule);
        self
    }

    pub fn with_delay(mut self, publisher: &str, delay: Duration) -> Self {
        self.delays.insert(Publisher::new(publisher), delay);
        self
    }
}

#[async_trait]
impl EquivalentScheduleResolver for MockEquivalentScheduleResolver {
    async fn resolve_schedules(
        &self,
        channels: &[Channel],
        window: ScheduleWindow,
        publisher: &Publisher,
        selected_sources: &[Publisher],
    ) -> Result<EquivalentSchedule, ResolverError> {
        self.calls
            .lock()
            .await
            .push((publisher.clone(), selected_sources.to_vec()));
        if let Some(delay) = self.delays.get(publisher) {
            tokio::time::sleep(*delay).await;
        }

        let interval = match window {
            ScheduleWindow::Interval(interval) => interval,
            ScheduleWindow::Count { start, .. } => Interval::instant(start),
        };
        let channel_schedules = self
            .schedules
            .get(publisher)
            .into_iter()
            .flatten()
            .filter(|schedule| channels.iter().any(|c| c.id == schedule.channel.id))
            .map(|schedule| match window {
                ScheduleWindow::Count { count, .. } => schedule.with_limited_broadcasts(count),
                ScheduleWindow::Interval(_) => schedule.clone(),
            })
            .collect();

        Ok(EquivalentSchedule::new(channel_schedules, interval))
    }
}

/// Plain schedules keyed by publisher.
#[derive(Debug, Default)]
pub struct MockScheduleResolver {
    schedules: HashMap<Publisher, Vec<ChannelSchedule>>,
    delays: HashMap<Publisher, Duration>,
    failure: Option<String>,
}

impl MockScheduleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(mut self, publisher: &str, schedule: ChannelSchedule) -> Self {
        self.schedules
            .entry(Publisher::new(publisher))
            .or_default()
            .push(schedule);
        self
    }

    pub fn with_delay(mut self, publisher: &str, delay: Duration) -> Self {
        self.delays.insert(Publisher::new(publisher), delay);
        self
    }

    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }
}

#[async_trait]
impl ScheduleResolver for MockScheduleResolver {
    async fn resolve(
        &self,
        channels: &[Channel],
        interval: Interval,
        publisher: &Publisher,
    ) -> Result<Schedule, ResolverError> {
        if let Some(delay) = self.delays.get(publisher) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(reason) = &self.failure {
            return Err(ResolverError::Unavailable {
                resolver: "mock schedule store",
                reason: reason.clone(),
            });
        }

        let channel_schedules = self
            .schedules
            .get(publisher)
            .into_iter()
            .flatten()
            .filter(|schedule| channels.iter().any(|c| c.id == schedule.channel.id))
            .cloned()
            .collect();
        Ok(Schedule::new(channel_schedules, interval))
    }
}

/// Fixed merged equivalents.
#[derive(Debug, Default)]
pub struct MockEquivalentsResolver {
    merged: HashMap<ItemId, Vec<Item>>,
    pub requested: Arc<Mutex<Vec<ItemId>>>,
}

impl MockEquivalentsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_merged(mut self, id: u64, item: Item) -> Self {
        self.merged.insert(ItemId::new(id), vec![item]);
        self
    }
}

#[async_trait]
impl MergingEquivalentsResolver for MockEquivalentsResolver {
    async fn resolve_ids(
        &self,
        ids: &[ItemId],
        _sources: &PrecedenceConfig,
    ) -> Result<ResolvedEquivalents, ResolverError> {
        self.requested.lock().await.extend_from_slice(ids);
        let merged = ids
            .iter()
            .filter_map(|id| self.merged.get(id).map(|items| (*id, items.clone())))
            .collect();
        Ok(ResolvedEquivalents::new(merged))
    }
}
