//! Forward walk over sorted original and override entries.
//!
//! Overrides win wherever they overlap an original. An original cut by an
//! override only keeps its prefix; the remainder is never re-appended after
//! the override, except when the override ends inside the original, in
//! which case the suffix is kept and checked against the next override.

use std::collections::VecDeque;
use std::mem;

use tracing::{debug, trace};

use crate::merger::follow_on::FollowOnState;
use crate::merger::{MergeError, ScheduleMerger};
use crate::model::{ChannelSchedule, ItemAndBroadcast};

/// Default [`ScheduleMerger`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayScheduleMerger;

impl OverlayScheduleMerger {
    pub fn new() -> Self {
        Self
    }
}

impl ScheduleMerger for OverlayScheduleMerger {
    fn merge(
        &self,
        original: &ChannelSchedule,
        overrides: &ChannelSchedule,
    ) -> Result<ChannelSchedule, MergeError> {
        if original.channel.id != overrides.channel.id {
            return Err(MergeError::ChannelMismatch {
                original: original.channel.id,
                override_channel: overrides.channel.id,
            });
        }

        let originals = original.sorted_entries();
        let override_entries = overrides.sorted_entries();

        if override_entries.is_empty() {
            return Ok(original.with_entries(originals));
        }

        let interval = original.interval.spanning(&overrides.interval);
        let merged = Overlay::new(originals, override_entries).run();

        debug!(
            channel = %original.channel.id,
            originals = original.entries.len(),
            overrides = overrides.entries.len(),
            merged = merged.len(),
            "Merged override schedule"
        );

        Ok(ChannelSchedule::new(
            original.channel.clone(),
            interval,
            merged,
        ))
    }
}

/// Walk state: both input queues, the override currently being compared
/// against, and the fate of follow-ons of the last original seen.
struct Overlay {
    originals: VecDeque<ItemAndBroadcast>,
    overrides: VecDeque<ItemAndBroadcast>,
    pending: Option<ItemAndBroadcast>,
    follow_on: FollowOnState,
    merged: Vec<ItemAndBroadcast>,
}

impl Overlay {
    fn new(originals: Vec<ItemAndBroadcast>, overrides: Vec<ItemAndBroadcast>) -> Self {
        let capacity = originals.len() + overrides.len();
        Self {
            originals: originals.into(),
            overrides: overrides.into(),
            pending: None,
            follow_on: FollowOnState::Normal,
            merged: Vec::with_capacity(capacity),
        }
    }

    fn run(mut self) -> Vec<ItemAndBroadcast> {
        while let Some(current) = self.originals.pop_front() {
            if current.broadcast.is_follow_on() {
                let state = mem::take(&mut self.follow_on);
                match state.apply(&current) {
                    Some(entry) => self.merged.push(entry),
                    None => trace!(at = %current.start(), "Dropped shadowed follow-on"),
                }
                continue;
            }

            self.follow_on = FollowOnState::Normal;
            self.place(current);
        }

        self.merged.extend(self.pending.take());
        self.merged.extend(self.overrides.drain(..));
        self.merged
    }

    /// Emits `current` (or what survives of it) and any overrides that end
    /// before it, leaving the first override it does not pass in `pending`.
    fn place(&mut self, mut current: ItemAndBroadcast) {
        loop {
            let Some(active) = self.pending.take().or_else(|| self.overrides.pop_front()) else {
                self.merged.push(current);
                return;
            };

            if current.start() >= active.end() {
                self.merged.push(active);
                continue;
            }

            if current.end() <= active.start() {
                self.merged.push(current);
                self.pending = Some(active);
                return;
            }

            if current.start() < active.start() {
                self.merged
                    .push(current.retimed(current.start(), active.start()));
                self.follow_on = FollowOnState::TruncateTo(active.start());
                self.pending = Some(active);
                return;
            }

            if current.end() > active.end() {
                let suffix = current.retimed(active.end(), current.end());
                self.merged.push(active);
                current = suffix;
                continue;
            }

            trace!(at = %current.start(), "Dropped original shadowed by override");
            self.follow_on = FollowOnState::Suppress;
            self.pending = Some(active);
            return;
        }
    }
}
