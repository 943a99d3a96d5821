//! Overlaying an override publisher's schedule onto an original schedule.

mod follow_on;
mod overlay;

pub use overlay::OverlayScheduleMerger;

use thiserror::Error;

use crate::model::{ChannelId, ChannelSchedule};

/// Merge precondition violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("Override should be for the same channel, got {original} {override_channel}")]
    ChannelMismatch {
        original: ChannelId,
        override_channel: ChannelId,
    },
}

/// Combines an original and an override schedule for one channel.
pub trait ScheduleMerger: Send + Sync + std::fmt::Debug {
    /// Produces a new time-ordered schedule; inputs are left untouched.
    ///
    /// # Errors
    /// - `MergeError::ChannelMismatch` - Schedules belong to different channels
    fn merge(
        &self,
        original: &ChannelSchedule,
        overrides: &ChannelSchedule,
    ) -> Result<ChannelSchedule, MergeError>;
}
