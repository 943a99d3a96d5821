//! Error types for schedule query execution.

use std::time::Duration;

use thiserror::Error;

use crate::merger::MergeError;
use crate::model::{ChannelId, InvertedInterval, Publisher};

/// Invalid schedule query construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("'count' must be between {min} and {max}, was {count}")]
    CountOutOfRange { count: usize, min: usize, max: usize },

    #[error("Query end must be after start")]
    EndNotAfterStart(#[from] InvertedInterval),

    #[error("Query start and end are identical")]
    EmptyWindow,

    #[error("Query interval cannot be longer than {max_hours} hours")]
    WindowTooLong { max_hours: i64 },

    #[error("Multi-channel query needs at least one channel id")]
    NoChannels,
}

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    #[error("{resolver} unavailable: {reason}")]
    Unavailable {
        resolver: &'static str,
        reason: String,
    },

    #[error("Request rejected: {reason}")]
    Rejected { reason: String },
}

/// Errors surfaced by schedule query executors.
#[derive(Debug, Error)]
pub enum ScheduleQueryError {
    #[error("Channel {channel_id} not found")]
    ChannelNotFound { channel_id: ChannelId },

    #[error("Publisher {publisher} is not enabled for this application")]
    Forbidden { publisher: Publisher },

    #[error("Unsupported request: {reason}")]
    UnsupportedRequest { reason: String },

    #[error(
        "Original schedule should have same number of items as override: \
         {original} vs. {overrides}, {channel_ids:?} | {override_publisher}"
    )]
    InconsistentMergeInput {
        original: usize,
        overrides: usize,
        channel_ids: Vec<ChannelId>,
        override_publisher: Publisher,
    },

    #[error("Schedule entry on channel {channel_id} is inconsistent: {reason}")]
    InconsistentEntry {
        channel_id: ChannelId,
        reason: String,
    },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Invalid query: {0}")]
    Query(#[from] QueryError),

    #[error("Resolution failed: {0}")]
    Resolver(#[from] ResolverError),

    #[error("Merge failed: {0}")]
    Merge(#[from] MergeError),
}

impl ScheduleQueryError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            ScheduleQueryError::ChannelNotFound { channel_id } => {
                format!("Unknown channel {channel_id}")
            }
            ScheduleQueryError::Forbidden { publisher } => {
                format!("Access to {publisher} is not permitted")
            }
            ScheduleQueryError::UnsupportedRequest { reason } => reason.clone(),
            ScheduleQueryError::Query(e) => e.to_string(),
            ScheduleQueryError::Timeout { .. } => "Schedule lookup timed out".to_string(),
            _ => "Schedule lookup failed".to_string(),
        }
    }

    /// Checks if the caller can fix this error by changing the request.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ScheduleQueryError::ChannelNotFound { .. }
                | ScheduleQueryError::Forbidden { .. }
                | ScheduleQueryError::UnsupportedRequest { .. }
                | ScheduleQueryError::Query(_)
        )
    }
}
