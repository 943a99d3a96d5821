use std::sync::Arc;

use async_trait::async_trait;
use futures::future::OptionFuture;
use tracing::{debug, info};

use crate::config::{ExecutorConfig, LineupConfig, QueryConfig};
use crate::errors::ScheduleQueryError;
use crate::executor::{
    QueryResult, ScheduleQueryExecutor, check_access, in_requested_order, into_result,
    merge_overrides, resolve_channels, with_timeout,
};
use crate::merger::{OverlayScheduleMerger, ScheduleMerger};
use crate::model::{ChannelSchedule, Interval, ItemAndBroadcast, ItemId, Schedule};
use crate::query::{QueryContext, ScheduleQuery, ScheduleWindow};
use crate::resolver::{ChannelResolver, MergingEquivalentsResolver, ScheduleResolver};

const COUNT_UNSUPPORTED: &str = "'count' parameter not supported in non-equivalent schedule store. \
     Please specify 'to' parameter in your request";

/// Executor backed by a plain, single-publisher schedule store.
///
/// Only end-bounded queries are supported. With precedence on, every
/// scheduled item is swapped for its merged equivalent afterwards.
#[derive(Debug, Clone)]
pub struct ScheduleResolverBackedExecutor {
    channels: Arc<dyn ChannelResolver>,
    schedules: Arc<dyn ScheduleResolver>,
    equivalents: Arc<dyn MergingEquivalentsResolver>,
    merger: Arc<dyn ScheduleMerger>,
    executor_config: ExecutorConfig,
    query_config: QueryConfig,
}

impl ScheduleResolverBackedExecutor {
    pub fn new(
        channels: Arc<dyn ChannelResolver>,
        schedules: Arc<dyn ScheduleResolver>,
        equivalents: Arc<dyn MergingEquivalentsResolver>,
        config: &LineupConfig,
    ) -> Self {
        Self {
            channels,
            schedules,
            equivalents,
            merger: Arc::new(OverlayScheduleMerger::new()),
            executor_config: config.executor.clone(),
            query_config: config.query.clone(),
        }
    }

    pub fn with_merger(mut self, merger: Arc<dyn ScheduleMerger>) -> Self {
        self.merger = merger;
        self
    }

    async fn resolve(
        &self,
        query: &ScheduleQuery,
        interval: Interval,
    ) -> Result<(Schedule, Option<Schedule>), ScheduleQueryError> {
        let channels = resolve_channels(
            self.channels.as_ref(),
            query,
            self.executor_config.channel_timeout,
        )
        .await?;
        let limit = self.executor_config.schedule_timeout;

        let primary = with_timeout(
            "schedule resolution",
            limit,
            self.schedules.resolve(&channels, interval, query.publisher()),
        );
        let overrides: OptionFuture<_> = query
            .override_publisher()
            .map(|publisher| {
                with_timeout(
                    "override schedule resolution",
                    limit,
                    self.schedules.resolve(&channels, interval, publisher),
                )
            })
            .into();

        tokio::try_join!(primary, async { overrides.await.transpose() })
    }

    /// Replaces each item with its merged equivalent, keeping only the
    /// broadcast that occupies the slot.
    async fn merge_equivalents(
        &self,
        schedules: Vec<ChannelSchedule>,
        context: &QueryContext,
    ) -> Result<Vec<ChannelSchedule>, ScheduleQueryError> {
        let mut ids: Vec<ItemId> = schedules
            .iter()
            .flat_map(|schedule| schedule.entries.iter().map(|entry| entry.item.id))
            .collect();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Ok(schedules);
        }

        let resolved = with_timeout(
            "equivalents resolution",
            self.executor_config.schedule_timeout,
            self.equivalents.resolve_ids(&ids, &context.sources),
        )
        .await?;
        debug!(items = ids.len(), "Resolved merged equivalents");

        Ok(schedules
            .into_iter()
            .map(|schedule| {
                let entries = schedule
                    .entries
                    .iter()
                    .map(|entry| {
                        let mut item = resolved
                            .get(entry.item.id)
                            .first()
                            .cloned()
                            .unwrap_or_else(|| entry.item.clone());
                        item.broadcasts.retain(|own| own.same_slot(&entry.broadcast));
                        if item.broadcasts.is_empty() {
                            item.broadcasts.push(entry.broadcast.clone());
                        }
                        ItemAndBroadcast::new(item, entry.broadcast.clone())
                    })
                    .collect();
                schedule.with_entries(entries)
            })
            .collect())
    }

    async fn prepare(
        &self,
        query: &ScheduleQuery,
        schedule: Schedule,
    ) -> Result<Vec<ChannelSchedule>, ScheduleQueryError> {
        let schedules = in_requested_order(query, schedule.channel_schedules);
        if query.context().merges_equivalents() {
            self.merge_equivalents(schedules, query.context()).await
        } else {
            Ok(schedules)
        }
    }
}

#[async_trait]
impl ScheduleQueryExecutor for ScheduleResolverBackedExecutor {
    async fn execute(&self, query: &ScheduleQuery) -> Result<QueryResult, ScheduleQueryError> {
        let ScheduleWindow::Interval(interval) = query.window() else {
            return Err(ScheduleQueryError::UnsupportedRequest {
                reason: COUNT_UNSUPPORTED.to_string(),
            });
        };
        check_access(query)?;
        query.check_duration(self.query_config.max_query_duration)?;

        let (primary, overrides) = self.resolve(query, interval).await?;
        let primary = self.prepare(query, primary).await?;

        let schedules = match (query.override_publisher(), overrides) {
            (Some(override_publisher), Some(overrides)) => {
                let overrides = self.prepare(query, overrides).await?;
                merge_overrides(
                    self.merger.as_ref(),
                    query,
                    override_publisher,
                    primary,
                    overrides,
                )?
            }
            _ => primary,
        };

        info!(
            schedules = schedules.len(),
            overridden = query.override_publisher().is_some(),
            "Executed schedule query"
        );

        into_result(query, schedules)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{DateTime, TimeZone, Utc};
    use tokio::time::Instant;

    use super::*;
    use crate::errors::ResolverError;
    use crate::executor::test_mocks::{
        MockChannelResolver, MockEquivalentsResolver, MockScheduleResolver,
    };
    use crate::model::{Broadcast, Channel, ChannelId, Item, Publisher};
    use crate::query::{PrecedenceConfig, TimeBound};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    fn schedule(channel: u64, entries: Vec<(u64, &str, DateTime<Utc>, DateTime<Utc>)>) -> ChannelSchedule {
        let entries = entries
            .into_iter()
            .map(|(id, publisher, start, end)| {
                let broadcast = Broadcast::new(ChannelId::new(channel), start, end).unwrap();
                let item = Item::new(id, Publisher::new(publisher), format!("item {id}"))
                    .with_broadcast(broadcast.clone());
                ItemAndBroadcast::new(item, broadcast)
            })
            .collect();
        ChannelSchedule::new(
            Channel::new(channel, format!("channel-{channel}")),
            Interval::new(at(9, 0), at(12, 0)).unwrap(),
            entries,
        )
    }

    fn executor(
        schedules: MockScheduleResolver,
        equivalents: MockEquivalentsResolver,
    ) -> ScheduleResolverBackedExecutor {
        ScheduleResolverBackedExecutor::new(
            Arc::new(MockChannelResolver::new(vec![
                Channel::new(1, "channel-1"),
                Channel::new(2, "channel-2"),
            ])),
            Arc::new(schedules),
            Arc::new(equivalents),
            &LineupConfig::for_testing(),
        )
    }

    fn query(bound: TimeBound, context: QueryContext) -> ScheduleQuery {
        ScheduleQuery::single(Publisher::new("pa"), ChannelId::new(1), at(9, 0), bound, context)
            .unwrap()
    }

    fn readable() -> QueryContext {
        QueryContext::new(PrecedenceConfig::without_precedence([
            Publisher::new("pa"),
            Publisher::new("ebs"),
        ]))
    }

    #[tokio::test]
    async fn test_count_bounded_query_is_unsupported() {
        let executor = executor(MockScheduleResolver::new(), MockEquivalentsResolver::new());

        let error = executor
            .execute(&query(TimeBound::Count(3), readable()))
            .await
            .unwrap_err();

        match error {
            ScheduleQueryError::UnsupportedRequest { reason } => {
                assert!(reason.contains("'count' parameter not supported"));
                assert!(reason.contains("'to'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_plain_schedule_passes_through() {
        let store = MockScheduleResolver::new()
            .with_schedule("pa", schedule(1, vec![(1, "pa", at(9, 0), at(10, 0))]));

        let result = executor(store, MockEquivalentsResolver::new())
            .execute(&query(TimeBound::End(at(12, 0)), readable()))
            .await
            .unwrap()
            .single()
            .unwrap();

        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].item.publisher, Publisher::new("pa"));
    }

    #[tokio::test]
    async fn test_precedence_swaps_in_merged_item_restricted_to_slot() {
        let store = MockScheduleResolver::new()
            .with_schedule("pa", schedule(1, vec![(1, "pa", at(9, 0), at(10, 0))]));
        let elsewhere = Broadcast::new(ChannelId::new(2), at(20, 0), at(21, 0)).unwrap();
        let merged = Item::new(8, Publisher::new("bbc"), "merged").with_broadcast(elsewhere);
        let equivalents = MockEquivalentsResolver::new().with_merged(1, merged);
        let requested = equivalents.requested.clone();
        let context = QueryContext::new(PrecedenceConfig::with_precedence([
            Publisher::new("bbc"),
            Publisher::new("pa"),
        ]));

        let result = executor(store, equivalents)
            .execute(&query(TimeBound::End(at(12, 0)), context))
            .await
            .unwrap()
            .single()
            .unwrap();

        let entry = &result.entries[0];
        assert_eq!(entry.item.title, "merged");
        assert_eq!(entry.item.broadcasts, vec![entry.broadcast.clone()]);
        assert_eq!(entry.broadcast.transmission_time, at(9, 0));
        assert_eq!(requested.lock().await.as_slice(), &[ItemId::new(1)]);
    }

    #[tokio::test]
    async fn test_non_merged_context_skips_equivalents() {
        let store = MockScheduleResolver::new()
            .with_schedule("pa", schedule(1, vec![(1, "pa", at(9, 0), at(10, 0))]));
        let equivalents = MockEquivalentsResolver::new()
            .with_merged(1, Item::new(8, Publisher::new("bbc"), "merged"));
        let requested = equivalents.requested.clone();
        let context = QueryContext::new(PrecedenceConfig::with_precedence([Publisher::new("pa")]))
            .non_merged();

        let result = executor(store, equivalents)
            .execute(&query(TimeBound::End(at(12, 0)), context))
            .await
            .unwrap()
            .single()
            .unwrap();

        assert_eq!(result.entries[0].item.title, "item 1");
        assert!(requested.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_override_merged_on_plain_path() {
        let store = MockScheduleResolver::new()
            .with_schedule("pa", schedule(1, vec![(1, "pa", at(9, 0), at(11, 0))]))
            .with_schedule("ebs", schedule(1, vec![(5, "ebs", at(10, 0), at(12, 0))]));

        let result = executor(store, MockEquivalentsResolver::new())
            .execute(&query(TimeBound::End(at(12, 0)), readable()).with_override(Publisher::new("ebs")))
            .await
            .unwrap()
            .single()
            .unwrap();

        let spans: Vec<_> = result
            .entries
            .iter()
            .map(|entry| (entry.item.id.as_u64(), entry.start(), entry.end()))
            .collect();
        assert_eq!(spans, vec![(1, at(9, 0), at(10, 0)), (5, at(10, 0), at(12, 0))]);
    }

    #[tokio::test]
    async fn test_unreadable_publisher_is_forbidden() {
        let context = QueryContext::new(PrecedenceConfig::without_precedence([Publisher::new("bbc")]));

        let error = executor(MockScheduleResolver::new(), MockEquivalentsResolver::new())
            .execute(&query(TimeBound::End(at(12, 0)), context))
            .await
            .unwrap_err();

        assert!(matches!(error, ScheduleQueryError::Forbidden { .. }));
        assert_eq!(error.user_message(), "Access to pa is not permitted");
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_failure_does_not_wait_for_override() {
        let store = MockScheduleResolver::new()
            .with_delay("ebs", Duration::from_secs(30))
            .failing("connection refused");
        let started = Instant::now();

        let error = executor(store, MockEquivalentsResolver::new())
            .execute(&query(TimeBound::End(at(12, 0)), readable()).with_override(Publisher::new("ebs")))
            .await
            .unwrap_err();

        assert!(matches!(error, ScheduleQueryError::Resolver(_)));
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_resolver_failure_propagates() {
        let store = MockScheduleResolver::new().failing("connection refused");

        let error = executor(store, MockEquivalentsResolver::new())
            .execute(&query(TimeBound::End(at(12, 0)), readable()))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            ScheduleQueryError::Resolver(ResolverError::Unavailable { .. })
        ));
        assert!(!error.is_user_error());
    }
}
