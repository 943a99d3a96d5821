//! Slow and failing collaborators surface as query failures.

use std::sync::Arc;
use std::time::Duration;

use lineup_core::model::Publisher;
use lineup_core::{
    EquivalentScheduleQueryExecutor, LineupConfig, ResolverError, ScheduleQueryError,
    ScheduleQueryExecutor, ScheduleResolverBackedExecutor,
};
use lineup_sim::{ResponseProfile, ScheduleFixture, SimulatedLineup};

use crate::common::{LISTINGS, morning, plain_context};

fn lineup_with(profile: ResponseProfile) -> Arc<SimulatedLineup> {
    let fixture = ScheduleFixture::from_json(LISTINGS).unwrap();
    Arc::new(SimulatedLineup::from_fixture(fixture).with_profile(profile))
}

#[tokio::test(start_paused = true)]
async fn test_slow_store_times_out_at_configured_limit() {
    let lineup = lineup_with(ResponseProfile::instant().with_delay(Duration::from_secs(5)));
    let config = LineupConfig::for_testing();
    let executor = EquivalentScheduleQueryExecutor::with_defaults(lineup.clone(), lineup, &config);
    let query = morning("pa", &[1], plain_context(&["pa"]));

    let error = executor.execute(&query).await.unwrap_err();

    match error {
        ScheduleQueryError::Timeout { operation, timeout } => {
            assert_eq!(operation, "channel resolution");
            assert_eq!(timeout, config.executor.channel_timeout);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_latency_within_limits_still_answers() {
    let lineup = lineup_with(
        ResponseProfile::instant()
            .with_delay(Duration::from_millis(200))
            .with_jitter(Duration::from_millis(300), 42),
    );
    let executor = EquivalentScheduleQueryExecutor::with_defaults(
        lineup.clone(),
        lineup,
        &LineupConfig::for_testing(),
    );
    let query = morning("pa", &[1, 2], plain_context(&["pa", "ebs"]))
        .with_override(Publisher::new("ebs"));

    let schedules = executor.execute(&query).await.unwrap().into_schedules();

    assert_eq!(schedules.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_schedule_timeout_applies_per_branch() {
    let lineup = lineup_with(ResponseProfile::instant().with_delay(Duration::from_millis(800)));
    let mut config = LineupConfig::for_testing();
    config.executor.schedule_timeout = Duration::from_millis(500);
    let executor = ScheduleResolverBackedExecutor::new(
        lineup.clone(),
        lineup.clone(),
        lineup,
        &config,
    );
    let query = morning("pa", &[1], plain_context(&["pa", "ebs"]))
        .with_override(Publisher::new("ebs"));

    let error = executor.execute(&query).await.unwrap_err();

    assert!(matches!(
        error,
        ScheduleQueryError::Timeout { timeout, .. } if timeout == Duration::from_millis(500)
    ));
}

#[tokio::test]
async fn test_store_failure_is_reported_as_resolution_error() {
    let lineup = lineup_with(ResponseProfile::instant().failing("replica lag"));
    let executor = EquivalentScheduleQueryExecutor::with_defaults(
        lineup.clone(),
        lineup,
        &LineupConfig::for_testing(),
    );
    let query = morning("pa", &[1], plain_context(&["pa"]));

    let error = executor.execute(&query).await.unwrap_err();

    assert!(matches!(
        error,
        ScheduleQueryError::Resolver(ResolverError::Unavailable { ref reason, .. }) if reason == "replica lag"
    ));
    assert_eq!(error.user_message(), "Schedule lookup failed");
}
