//! End-to-end queries against the shared listings fixture.

use std::sync::Arc;

use lineup_core::model::{ChannelId, Publisher};
use lineup_core::{
    EquivalentScheduleQueryExecutor, LineupConfig, QueryResult, ScheduleQuery,
    ScheduleQueryError, ScheduleQueryExecutor, ScheduleResolverBackedExecutor, TimeBound,
};
use lineup_sim::{ScheduleFixture, SimulatedLineup};
use tempfile::NamedTempFile;

use crate::common::{LISTINGS, at, lineup, morning, plain_context};

fn equivalent_executor() -> EquivalentScheduleQueryExecutor {
    let lineup = lineup();
    EquivalentScheduleQueryExecutor::with_defaults(lineup.clone(), lineup, &LineupConfig::for_testing())
}

fn plain_executor() -> ScheduleResolverBackedExecutor {
    let lineup = lineup();
    ScheduleResolverBackedExecutor::new(
        lineup.clone(),
        lineup.clone(),
        lineup,
        &LineupConfig::for_testing(),
    )
}

fn titles(result: QueryResult) -> Vec<Vec<String>> {
    result
        .into_schedules()
        .into_iter()
        .map(|schedule| {
            schedule
                .entries
                .into_iter()
                .map(|entry| entry.item.title)
                .collect()
        })
        .collect()
}

#[tokio::test]
async fn test_multi_channel_schedules_follow_request_order() {
    let query = morning("pa", &[2, 1], plain_context(&["pa"]));

    let result = equivalent_executor().execute(&query).await.unwrap();

    let QueryResult::List(schedules) = &result else {
        panic!("multi-channel query should return a list, got {result:?}");
    };
    let ids: Vec<u64> = schedules.iter().map(|s| s.channel.id.as_u64()).collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(
        titles(result),
        vec![
            vec!["Film"],
            vec!["Breakfast", "Breakfast", "Homes Under the Hammer"],
        ]
    );
}

#[tokio::test]
async fn test_override_truncates_original_and_collapses_follow_on() {
    let query = morning("pa", &[1], plain_context(&["pa", "ebs"]))
        .with_override(Publisher::new("ebs"));

    let schedule = equivalent_executor()
        .execute(&query)
        .await
        .unwrap()
        .single()
        .unwrap();

    let spans: Vec<(&str, _, _)> = schedule
        .entries
        .iter()
        .map(|entry| (entry.item.title.as_str(), entry.start(), entry.end()))
        .collect();
    assert_eq!(
        spans,
        vec![
            ("Breakfast", at(9, 0), at(9, 30)),
            ("Breakfast", at(9, 30), at(9, 30)),
            ("Live Football", at(9, 30), at(9, 45)),
            ("Homes Under the Hammer", at(10, 0), at(11, 0)),
        ]
    );
    assert_eq!(schedule.interval.start(), at(9, 0));
    assert_eq!(schedule.interval.end(), at(12, 0));
}

#[tokio::test]
async fn test_plain_and_equivalent_paths_agree_without_precedence() {
    let query = morning("pa", &[1, 2], plain_context(&["pa", "ebs"]))
        .with_override(Publisher::new("ebs"));

    let equivalent = equivalent_executor().execute(&query).await.unwrap();
    let plain = plain_executor().execute(&query).await.unwrap();

    assert_eq!(equivalent, plain);
}

#[tokio::test]
async fn test_count_bounded_query_narrows_interval() {
    let query = ScheduleQuery::single(
        Publisher::new("pa"),
        ChannelId::new(1),
        at(9, 0),
        TimeBound::Count(2),
        plain_context(&["pa"]),
    )
    .unwrap();

    let schedule = equivalent_executor()
        .execute(&query)
        .await
        .unwrap()
        .single()
        .unwrap();

    assert_eq!(schedule.entries.len(), 2);
    assert!(schedule.entries[1].broadcast.is_follow_on());
    assert_eq!(schedule.interval.end(), at(10, 0));
}

#[tokio::test]
async fn test_plain_path_rejects_count_bounded_query() {
    let query = ScheduleQuery::single(
        Publisher::new("pa"),
        ChannelId::new(1),
        at(9, 0),
        TimeBound::Count(2),
        plain_context(&["pa"]),
    )
    .unwrap();

    let error = plain_executor().execute(&query).await.unwrap_err();

    assert!(matches!(error, ScheduleQueryError::UnsupportedRequest { .. }));
    assert!(error.user_message().contains("'to' parameter"));
}

#[tokio::test]
async fn test_unknown_channel_in_multi_query_is_not_found() {
    let query = morning("pa", &[1, 7], plain_context(&["pa"]));

    let error = equivalent_executor().execute(&query).await.unwrap_err();

    assert!(matches!(
        error,
        ScheduleQueryError::ChannelNotFound { channel_id } if channel_id == ChannelId::new(7)
    ));
}

#[tokio::test]
async fn test_unreadable_override_publisher_is_forbidden() {
    let query = morning("pa", &[1], plain_context(&["pa"])).with_override(Publisher::new("ebs"));

    let error = equivalent_executor().execute(&query).await.unwrap_err();

    assert!(matches!(error, ScheduleQueryError::Forbidden { publisher } if publisher.key() == "ebs"));
}

#[tokio::test]
async fn test_results_serialize_for_callers() {
    let query = morning("pa", &[2], plain_context(&["pa"]));

    let result = equivalent_executor().execute(&query).await.unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["channel"]["key"], "bbctwo");
    assert_eq!(json["entries"][0]["item"]["title"], "Film");
    assert_eq!(json["entries"][0]["broadcast"]["source_id"], "pa:film");
}

#[tokio::test]
async fn test_fixture_saved_to_disk_serves_the_same_listings() {
    let file = NamedTempFile::new().unwrap();
    let json = ScheduleFixture::from_json(LISTINGS).unwrap().to_json().unwrap();
    std::fs::write(file.path(), json).unwrap();

    let reloaded = Arc::new(SimulatedLineup::from_fixture(
        ScheduleFixture::load(file.path()).unwrap(),
    ));
    let executor = EquivalentScheduleQueryExecutor::with_defaults(
        reloaded.clone(),
        reloaded,
        &LineupConfig::for_testing(),
    );
    let query = morning("pa", &[2, 1], plain_context(&["pa"]));

    let from_disk = executor.execute(&query).await.unwrap();
    let in_memory = equivalent_executor().execute(&query).await.unwrap();

    assert_eq!(titles(from_disk), titles(in_memory));
}
