//! Schedule query execution.
//!
//! Executors resolve channels first, then the primary and (optionally)
//! override schedules concurrently, select one item per slot and finally
//! overlay the override schedule channel by channel. Every collaborator
//! call is bounded by its own timeout; nothing is retried here.

mod equivalent;
mod plain;
#[cfg(test)]
mod test_mocks;

pub use equivalent::EquivalentScheduleQueryExecutor;
pub use plain::ScheduleResolverBackedExecutor;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::ScheduleQueryError;
use crate::merger::ScheduleMerger;
use crate::model::{Channel, ChannelSchedule, Publisher};
use crate::query::{ChannelScope, ScheduleQuery};
use crate::resolver::ChannelResolver;

/// Runs schedule queries against a set of collaborators.
#[async_trait]
pub trait ScheduleQueryExecutor: Send + Sync + std::fmt::Debug {
    /// Executes `query`; the result kind mirrors the query's channel scope.
    ///
    /// # Errors
    /// - `ScheduleQueryError::ChannelNotFound` - A requested channel is unknown
    /// - `ScheduleQueryError::Forbidden` - Publisher not readable by the caller
    /// - `ScheduleQueryError::Timeout` - A resolution step exceeded its bound
    /// - `ScheduleQueryError::InconsistentMergeInput` - Override coverage differs
    async fn execute(&self, query: &ScheduleQuery) -> Result<QueryResult, ScheduleQueryError>;
}

/// Outcome of an executed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResult {
    Single(ChannelSchedule),
    /// One schedule per requested channel, in request order
    List(Vec<ChannelSchedule>),
}

impl QueryResult {
    pub fn into_schedules(self) -> Vec<ChannelSchedule> {
        match self {
            QueryResult::Single(schedule) => vec![schedule],
            QueryResult::List(schedules) => schedules,
        }
    }

    pub fn single(self) -> Option<ChannelSchedule> {
        match self {
            QueryResult::Single(schedule) => Some(schedule),
            QueryResult::List(_) => None,
        }
    }
}

/// Awaits `future` for at most `limit`.
pub(crate) async fn with_timeout<T, E, F>(
    operation: &'static str,
    limit: Duration,
    future: F,
) -> Result<T, ScheduleQueryError>
where
    F: Future<Output = Result<T, E>>,
    ScheduleQueryError: From<E>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result.map_err(ScheduleQueryError::from),
        Err(_) => {
            warn!(operation, timeout = ?limit, "Resolution timed out");
            Err(ScheduleQueryError::Timeout {
                operation,
                timeout: limit,
            })
        }
    }
}

/// Rejects queries for publishers the caller cannot read.
pub(crate) fn check_access(query: &ScheduleQuery) -> Result<(), ScheduleQueryError> {
    let sources = &query.context().sources;
    let requested = std::iter::once(query.publisher()).chain(query.override_publisher());

    for publisher in requested {
        if !sources.is_read_enabled(publisher) {
            warn!(publisher = %publisher, "Publisher not enabled for caller");
            return Err(ScheduleQueryError::Forbidden {
                publisher: publisher.clone(),
            });
        }
    }
    Ok(())
}

/// Resolves every requested channel or fails with the first missing id.
pub(crate) async fn resolve_channels(
    resolver: &dyn ChannelResolver,
    query: &ScheduleQuery,
    limit: Duration,
) -> Result<Vec<Channel>, ScheduleQueryError> {
    let requested = query.requested_channel_ids();
    let channels = with_timeout("channel resolution", limit, resolver.resolve_ids(requested))
        .await?
        .into_resources();

    if let Some(missing) = requested
        .iter()
        .find(|id| !channels.iter().any(|channel| channel.id == **id))
    {
        warn!(channel = %missing, resolved = channels.len(), "Channel not found");
        return Err(ScheduleQueryError::ChannelNotFound {
            channel_id: *missing,
        });
    }

    debug!(channels = channels.len(), "Resolved channels");
    Ok(channels)
}

/// Publishers whose content may fill schedule slots.
pub(crate) fn selected_sources(query: &ScheduleQuery) -> Vec<Publisher> {
    let sources = &query.context().sources;
    if sources.precedence_enabled {
        sources.enabled_read_sources.clone()
    } else {
        vec![query.publisher().clone()]
    }
}

/// Reorders `schedules` to follow the requested channel ids.
pub(crate) fn in_requested_order(
    query: &ScheduleQuery,
    mut schedules: Vec<ChannelSchedule>,
) -> Vec<ChannelSchedule> {
    let mut ordered = Vec::with_capacity(schedules.len());
    for id in query.requested_channel_ids() {
        if let Some(position) = schedules.iter().position(|s| s.channel.id == *id) {
            ordered.push(schedules.swap_remove(position));
        }
    }
    for unexpected in &schedules {
        warn!(channel = %unexpected.channel.id, "Dropping schedule for unrequested channel");
    }
    ordered
}

/// Overlays `overrides` onto `primary`, pairing schedules positionally.
pub(crate) fn merge_overrides(
    merger: &dyn ScheduleMerger,
    query: &ScheduleQuery,
    override_publisher: &Publisher,
    primary: Vec<ChannelSchedule>,
    overrides: Vec<ChannelSchedule>,
) -> Result<Vec<ChannelSchedule>, ScheduleQueryError> {
    if primary.len() != overrides.len() {
        return Err(ScheduleQueryError::InconsistentMergeInput {
            original: primary.len(),
            overrides: overrides.len(),
            channel_ids: query.requested_channel_ids().to_vec(),
            override_publisher: override_publisher.clone(),
        });
    }

    primary
        .iter()
        .zip(&overrides)
        .map(|(original, override_schedule)| {
            merger
                .merge(original, override_schedule)
                .map_err(ScheduleQueryError::from)
        })
        .collect()
}

/// Shapes ordered schedules into the result kind of `query`.
pub(crate) fn into_result(
    query: &ScheduleQuery,
    schedules: Vec<ChannelSchedule>,
) -> Result<QueryResult, ScheduleQueryError> {
    match query.scope() {
        ChannelScope::Single(channel_id) => schedules
            .into_iter()
            .next()
            .map(QueryResult::Single)
            .ok_or(ScheduleQueryError::ChannelNotFound {
                channel_id: *channel_id,
            }),
        ChannelScope::Multi(_) => Ok(QueryResult::List(schedules)),
    }
}
