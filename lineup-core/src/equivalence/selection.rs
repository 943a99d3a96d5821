use std::sync::Arc;

use tracing::debug;

use crate::equivalence::EquivalentsMerger;
use crate::errors::ScheduleQueryError;
use crate::matcher::BroadcastMatcher;
use crate::model::{
    ChannelId, ChannelSchedule, EquivalentChannelSchedule, EquivalentSchedule,
    EquivalentScheduleEntry, ItemAndBroadcast,
};
use crate::query::QueryContext;

/// Turns equivalence-aware schedules into plain item-per-slot schedules.
///
/// With merging on, each slot's equivalence set is collapsed by the
/// [`EquivalentsMerger`] and the slot broadcast is re-picked from the
/// representative item. Otherwise the item already carrying the slot's
/// broadcast is used. Slots are never dropped or moved.
#[derive(Debug, Clone)]
pub struct EquivalenceSelector {
    merger: Arc<dyn EquivalentsMerger>,
    matcher: Arc<dyn BroadcastMatcher>,
}

impl EquivalenceSelector {
    pub fn new(merger: Arc<dyn EquivalentsMerger>, matcher: Arc<dyn BroadcastMatcher>) -> Self {
        Self { merger, matcher }
    }

    /// Selects content for every channel schedule, keeping their order.
    ///
    /// # Errors
    /// - `ScheduleQueryError::InconsistentEntry` - A slot has no usable item
    pub fn select_schedule(
        &self,
        schedule: &EquivalentSchedule,
        context: &QueryContext,
    ) -> Result<Vec<ChannelSchedule>, ScheduleQueryError> {
        schedule
            .channel_schedules
            .iter()
            .map(|channel_schedule| self.select_channel(channel_schedule, context))
            .collect()
    }

    /// Selects content for one channel.
    ///
    /// # Errors
    /// - `ScheduleQueryError::InconsistentEntry` - A slot has no usable item
    pub fn select_channel(
        &self,
        schedule: &EquivalentChannelSchedule,
        context: &QueryContext,
    ) -> Result<ChannelSchedule, ScheduleQueryError> {
        let channel_id = schedule.channel.id;
        let entries = schedule
            .entries
            .iter()
            .map(|entry| {
                if context.merges_equivalents() {
                    self.merge_entry(channel_id, entry, context)
                } else {
                    select_entry(channel_id, entry)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            channel = %channel_id,
            entries = entries.len(),
            merged = context.merges_equivalents(),
            "Selected schedule content"
        );

        Ok(ChannelSchedule::new(
            schedule.channel.clone(),
            schedule.interval,
            entries,
        ))
    }

    fn merge_entry(
        &self,
        channel_id: ChannelId,
        entry: &EquivalentScheduleEntry,
        context: &QueryContext,
    ) -> Result<ItemAndBroadcast, ScheduleQueryError> {
        let mut merged = self.merger.merge(None, &entry.items, &context.sources);
        if merged.len() != 1 {
            return Err(ScheduleQueryError::InconsistentEntry {
                channel_id,
                reason: format!(
                    "expected one merged item for broadcast at {}, got {}",
                    entry.broadcast.transmission_time,
                    merged.len()
                ),
            });
        }
        let item = merged.remove(0);

        let broadcast = self
            .matcher
            .find_matching_broadcast(&entry.broadcast, &item.broadcasts)
            .unwrap_or_else(|| entry.broadcast.clone());

        Ok(ItemAndBroadcast::new(item, broadcast))
    }
}

fn select_entry(
    channel_id: ChannelId,
    entry: &EquivalentScheduleEntry,
) -> Result<ItemAndBroadcast, ScheduleQueryError> {
    let item = entry
        .items
        .iter()
        .find(|item| item.has_broadcast(&entry.broadcast))
        .or_else(|| entry.items.first())
        .ok_or_else(|| ScheduleQueryError::InconsistentEntry {
            channel_id,
            reason: format!(
                "no items for broadcast at {}",
                entry.broadcast.transmission_time
            ),
        })?;

    Ok(ItemAndBroadcast::new(item.clone(), entry.broadcast.clone()))
}
