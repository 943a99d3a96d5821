//! In-memory catalogue implementing every resolver trait.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lineup_core::ResolverError;
use lineup_core::equivalence::{EquivalentsMerger, PrecedenceEquivalentsMerger};
use lineup_core::model::{
    Broadcast, Channel, ChannelId, ChannelSchedule, EquivalentChannelSchedule, EquivalentSchedule,
    EquivalentScheduleEntry, Interval, Item, ItemAndBroadcast, ItemId, Publisher, Schedule,
};
use lineup_core::query::{PrecedenceConfig, ScheduleWindow};
use lineup_core::resolver::{
    ChannelResolver, EquivalentScheduleResolver, MergingEquivalentsResolver, Resolved,
    ResolvedEquivalents, ScheduleResolver,
};
use parking_lot::RwLock;
use tracing::debug;

use crate::fixture::ScheduleFixture;
use crate::profile::ResponseProfile;

/// Channels, items and equivalence sets served from memory.
///
/// Schedules are derived from item broadcasts: an item appears in a
/// channel's schedule for each of its broadcasts on that channel.
#[derive(Debug, Default)]
pub struct SimulatedLineup {
    catalogue: RwLock<Catalogue>,
    profile: ResponseProfile,
}

#[derive(Debug, Default)]
struct Catalogue {
    channels: BTreeMap<ChannelId, Channel>,
    items: BTreeMap<ItemId, Item>,
    equivalences: Vec<BTreeSet<ItemId>>,
}

impl Catalogue {
    fn equivalents_of(&self, id: ItemId) -> BTreeSet<ItemId> {
        self.equivalences
            .iter()
            .find(|set| set.contains(&id))
            .cloned()
            .unwrap_or_else(|| BTreeSet::from([id]))
    }

    /// Broadcasts of `publisher` on `channel` accepted by `airs`, time ordered.
    fn slots(
        &self,
        channel: ChannelId,
        publisher: &Publisher,
        airs: impl Fn(&Broadcast) -> bool,
    ) -> Vec<(&Item, &Broadcast)> {
        let mut slots: Vec<_> = self
            .items
            .values()
            .filter(|item| item.publisher == *publisher)
            .flat_map(|item| item.broadcasts.iter().map(move |b| (item, b)))
            .filter(|(_, broadcast)| broadcast.channel_id == channel && airs(broadcast))
            .collect();
        slots.sort_by(|(_, a), (_, b)| a.cmp_transmission(b));
        slots
    }

    /// `primary` followed by its equivalents from `sources`.
    fn equivalence_set(&self, primary: &Item, sources: &[Publisher]) -> Vec<Item> {
        let mut items = vec![primary.clone()];
        items.extend(
            self.equivalents_of(primary.id)
                .into_iter()
                .filter(|id| *id != primary.id)
                .filter_map(|id| self.items.get(&id))
                .filter(|item| sources.contains(&item.publisher))
                .cloned(),
        );
        items
    }
}

fn airs_within(interval: Interval, broadcast: &Broadcast) -> bool {
    interval.overlaps(&broadcast.transmission_interval())
        || (broadcast.is_follow_on() && interval.contains(broadcast.transmission_time))
}

fn starts_from(start: DateTime<Utc>, broadcast: &Broadcast) -> bool {
    broadcast.transmission_time >= start
}

impl SimulatedLineup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: ScheduleFixture) -> Self {
        let lineup = Self::new();
        for channel in fixture.channels {
            lineup.add_channel(channel);
        }
        for item in fixture.items {
            lineup.add_item(item);
        }
        for set in &fixture.equivalences {
            lineup.add_equivalence(set);
        }
        lineup
    }

    pub fn with_profile(mut self, profile: ResponseProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn add_channel(&self, channel: Channel) {
        self.catalogue.write().channels.insert(channel.id, channel);
    }

    /// Adds or replaces an item.
    pub fn add_item(&self, item: Item) {
        self.catalogue.write().items.insert(item.id, item);
    }

    /// Marks `ids` as equivalent, joining any sets they already belong to.
    pub fn add_equivalence(&self, ids: &[ItemId]) {
        let mut catalogue = self.catalogue.write();
        let mut joined: BTreeSet<ItemId> = ids.iter().copied().collect();
        catalogue.equivalences.retain(|set| {
            if set.iter().any(|id| joined.contains(id)) {
                joined.extend(set.iter().copied());
                false
            } else {
                true
            }
        });
        catalogue.equivalences.push(joined);
    }
}

#[async_trait]
impl ChannelResolver for SimulatedLineup {
    async fn resolve_ids(&self, ids: &[ChannelId]) -> Result<Resolved<Channel>, ResolverError> {
        self.profile.respond("simulated channel store").await?;

        let catalogue = self.catalogue.read();
        let channels = ids
            .iter()
            .filter_map(|id| catalogue.channels.get(id).cloned())
            .collect();
        Ok(Resolved::new(channels))
    }
}

#[async_trait]
impl ScheduleResolver for SimulatedLineup {
    async fn resolve(
        &self,
        channels: &[Channel],
        interval: Interval,
        publisher: &Publisher,
    ) -> Result<Schedule, ResolverError> {
        self.profile.respond("simulated schedule store").await?;

        let catalogue = self.catalogue.read();
        let channel_schedules = channels
            .iter()
            .map(|channel| {
                let entries = catalogue
                    .slots(channel.id, publisher, |b| airs_within(interval, b))
                    .into_iter()
                    .map(|(item, broadcast)| ItemAndBroadcast::new(item.clone(), broadcast.clone()))
                    .collect();
                ChannelSchedule::new(channel.clone(), interval, entries)
            })
            .collect();

        debug!(%publisher, channels = channels.len(), "Resolved simulated schedule");
        Ok(Schedule::new(channel_schedules, interval))
    }
}

#[async_trait]
impl EquivalentScheduleResolver for SimulatedLineup {
    async fn resolve_schedules(
        &self,
        channels: &[Channel],
        window: ScheduleWindow,
        publisher: &Publisher,
        selected_sources: &[Publisher],
    ) -> Result<EquivalentSchedule, ResolverError> {
        self.profile.respond("simulated equivalent schedule store").await?;

        let catalogue = self.catalogue.read();
        let channel_schedules: Vec<EquivalentChannelSchedule> = channels
            .iter()
            .map(|channel| {
                let (interval, slots) = match window {
                    ScheduleWindow::Interval(interval) => (
                        interval,
                        catalogue.slots(channel.id, publisher, |b| airs_within(interval, b)),
                    ),
                    ScheduleWindow::Count { start, .. } => (
                        Interval::instant(start),
                        catalogue.slots(channel.id, publisher, |b| starts_from(start, b)),
                    ),
                };
                let entries = slots
                    .into_iter()
                    .map(|(item, broadcast)| {
                        EquivalentScheduleEntry::new(
                            broadcast.clone(),
                            catalogue.equivalence_set(item, selected_sources),
                        )
                    })
                    .collect();
                let schedule = EquivalentChannelSchedule::new(channel.clone(), interval, entries);
                match window {
                    ScheduleWindow::Count { count, .. } => schedule.with_limited_broadcasts(count),
                    ScheduleWindow::Interval(_) => schedule,
                }
            })
            .collect();

        let interval = match window {
            ScheduleWindow::Interval(interval) => interval,
            ScheduleWindow::Count { start, .. } => channel_schedules
                .iter()
                .fold(Interval::instant(start), |span, schedule| {
                    span.spanning(&schedule.interval)
                }),
        };

        debug!(
            %publisher,
            channels = channels.len(),
            sources = selected_sources.len(),
            "Resolved simulated equivalent schedule"
        );
        Ok(EquivalentSchedule::new(channel_schedules, interval))
    }
}

#[async_trait]
impl MergingEquivalentsResolver for SimulatedLineup {
    async fn resolve_ids(
        &self,
        ids: &[ItemId],
        sources: &PrecedenceConfig,
    ) -> Result<ResolvedEquivalents, ResolverError> {
        self.profile.respond("simulated equivalents store").await?;

        let catalogue = self.catalogue.read();
        let merger = PrecedenceEquivalentsMerger::new();
        let merged = ids
            .iter()
            .filter(|id| catalogue.items.contains_key(id))
            .map(|id| {
                let members: Vec<Item> = catalogue
                    .equivalents_of(*id)
                    .into_iter()
                    .filter_map(|member| catalogue.items.get(&member).cloned())
                    .collect();
                (*id, merger.merge(Some(*id), &members, sources))
            })
            .collect();

        Ok(ResolvedEquivalents::new(merged))
    }
}
