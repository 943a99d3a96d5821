//! Override merging must pair primary and override schedules exactly.

use std::sync::Arc;

use async_trait::async_trait;
use lineup_core::model::{Channel, EquivalentSchedule, Interval, Publisher, Schedule};
use lineup_core::query::ScheduleWindow;
use lineup_core::resolver::{EquivalentScheduleResolver, ScheduleResolver};
use lineup_core::{
    EquivalentScheduleQueryExecutor, LineupConfig, ResolverError, ScheduleQueryError,
    ScheduleQueryExecutor, ScheduleResolverBackedExecutor,
};
use lineup_sim::SimulatedLineup;

use crate::common::{lineup, morning, plain_context};

/// Store that loses every channel but the first for one publisher.
#[derive(Debug)]
struct PartialOverrideStore {
    inner: Arc<SimulatedLineup>,
    truncated: Publisher,
}

impl PartialOverrideStore {
    fn new(truncated: &str) -> Self {
        Self {
            inner: lineup(),
            truncated: Publisher::new(truncated),
        }
    }
}

#[async_trait]
impl EquivalentScheduleResolver for PartialOverrideStore {
    async fn resolve_schedules(
        &self,
        channels: &[Channel],
        window: ScheduleWindow,
        publisher: &Publisher,
        selected_sources: &[Publisher],
    ) -> Result<EquivalentSchedule, ResolverError> {
        let mut schedule = self
            .inner
            .resolve_schedules(channels, window, publisher, selected_sources)
            .await?;
        if *publisher == self.truncated {
            schedule.channel_schedules.truncate(1);
        }
        Ok(schedule)
    }
}

#[async_trait]
impl ScheduleResolver for PartialOverrideStore {
    async fn resolve(
        &self,
        channels: &[Channel],
        interval: Interval,
        publisher: &Publisher,
    ) -> Result<Schedule, ResolverError> {
        let mut schedule = self.inner.resolve(channels, interval, publisher).await?;
        if *publisher == self.truncated {
            schedule.channel_schedules.truncate(1);
        }
        Ok(schedule)
    }
}

fn assert_mismatch(error: ScheduleQueryError) {
    match error {
        ScheduleQueryError::InconsistentMergeInput {
            original,
            overrides,
            channel_ids,
            override_publisher,
        } => {
            assert_eq!((original, overrides), (2, 1));
            assert_eq!(channel_ids.len(), 2);
            assert_eq!(override_publisher, Publisher::new("ebs"));
        }
        other => panic!("expected inconsistent merge input, got {other:?}"),
    }
}

#[tokio::test]
async fn test_equivalent_path_refuses_partial_override() {
    let store = Arc::new(PartialOverrideStore::new("ebs"));
    let executor = EquivalentScheduleQueryExecutor::with_defaults(
        store.inner.clone(),
        store,
        &LineupConfig::for_testing(),
    );
    let query = morning("pa", &[1, 2], plain_context(&["pa", "ebs"]))
        .with_override(Publisher::new("ebs"));

    let error = executor.execute(&query).await.unwrap_err();

    assert!(!error.is_user_error());
    assert_mismatch(error);
}

#[tokio::test]
async fn test_plain_path_refuses_partial_override() {
    let store = Arc::new(PartialOverrideStore::new("ebs"));
    let executor = ScheduleResolverBackedExecutor::new(
        store.inner.clone(),
        store.clone(),
        store.inner.clone(),
        &LineupConfig::for_testing(),
    );
    let query = morning("pa", &[1, 2], plain_context(&["pa", "ebs"]))
        .with_override(Publisher::new("ebs"));

    let error = tokio_test::assert_err!(executor.execute(&query).await);

    assert_mismatch(error);
}

#[tokio::test]
async fn test_query_without_override_is_unaffected() {
    let store = Arc::new(PartialOverrideStore::new("ebs"));
    let executor = EquivalentScheduleQueryExecutor::with_defaults(
        store.inner.clone(),
        store,
        &LineupConfig::for_testing(),
    );
    let query = morning("pa", &[1, 2], plain_context(&["pa"]));

    let schedules = executor.execute(&query).await.unwrap().into_schedules();

    assert_eq!(schedules.len(), 2);
}
