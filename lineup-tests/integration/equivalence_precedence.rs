//! Representative selection across publishers.

use std::sync::Arc;

use chrono::Duration;
use lineup_core::model::{Broadcast, Channel, ChannelId, Item, ItemId, Publisher};
use lineup_core::{
    EquivalentScheduleQueryExecutor, LineupConfig, ScheduleQueryExecutor,
    ScheduleResolverBackedExecutor,
};
use lineup_sim::SimulatedLineup;

use crate::common::{at, lineup, morning, precedence_context};

/// `pub-x` lists the slot; `pub-y` carries the same work three seconds late.
fn late_equivalent() -> Arc<SimulatedLineup> {
    let slot = Broadcast::new(ChannelId::new(1), at(9, 0), at(10, 0)).unwrap();
    let late = Broadcast::new(
        ChannelId::new(1),
        at(9, 0) + Duration::seconds(3),
        at(10, 0),
    )
    .unwrap()
    .with_source_id("y:1");

    let lineup = SimulatedLineup::new();
    lineup.add_channel(Channel::new(1, "one"));
    lineup.add_item(Item::new(1, Publisher::new("pub-x"), "X").with_broadcast(slot));
    lineup.add_item(Item::new(2, Publisher::new("pub-y"), "Y").with_broadcast(late));
    lineup.add_equivalence(&[ItemId::new(1), ItemId::new(2)]);
    Arc::new(lineup)
}

#[tokio::test]
async fn test_precedence_picks_representative_keeping_reference_broadcast() {
    let lineup = late_equivalent();
    let executor = EquivalentScheduleQueryExecutor::with_defaults(
        lineup.clone(),
        lineup,
        &LineupConfig::for_testing(),
    );
    let query = morning("pub-x", &[1], precedence_context(&["pub-y", "pub-x"]));

    let schedule = executor.execute(&query).await.unwrap().single().unwrap();

    let entry = &schedule.entries[0];
    assert_eq!(entry.item.title, "Y");
    assert_eq!(entry.start(), at(9, 0));
    assert_eq!(entry.broadcast.source_id, None);
}

#[tokio::test]
async fn test_flexible_matcher_reattaches_representative_broadcast() {
    let lineup = late_equivalent();
    let mut config = LineupConfig::for_testing();
    config.matcher.start_flexibility = Duration::seconds(5);
    config.matcher.end_flexibility = None;
    let executor = EquivalentScheduleQueryExecutor::with_defaults(lineup.clone(), lineup, &config);
    let query = morning("pub-x", &[1], precedence_context(&["pub-y", "pub-x"]));

    let schedule = executor.execute(&query).await.unwrap().single().unwrap();

    let entry = &schedule.entries[0];
    assert_eq!(entry.item.title, "Y");
    assert_eq!(entry.broadcast.source_id.as_deref(), Some("y:1"));
    assert_eq!(entry.start(), at(9, 0) + Duration::seconds(3));
}

#[tokio::test]
async fn test_non_merged_context_keeps_primary_item() {
    let lineup = late_equivalent();
    let executor = EquivalentScheduleQueryExecutor::with_defaults(
        lineup.clone(),
        lineup,
        &LineupConfig::for_testing(),
    );
    let query = morning(
        "pub-x",
        &[1],
        precedence_context(&["pub-y", "pub-x"]).non_merged(),
    );

    let schedule = executor.execute(&query).await.unwrap().single().unwrap();

    assert_eq!(schedule.entries[0].item.title, "X");
}

#[tokio::test]
async fn test_plain_path_swaps_in_merged_item_on_slot_broadcast() {
    let lineup = lineup();
    let executor = ScheduleResolverBackedExecutor::new(
        lineup.clone(),
        lineup.clone(),
        lineup,
        &LineupConfig::for_testing(),
    );
    let query = morning("pa", &[2], precedence_context(&["bbc", "pa"]));

    let schedule = executor.execute(&query).await.unwrap().single().unwrap();

    let entry = &schedule.entries[0];
    assert_eq!(entry.item.title, "Film (BBC)");
    assert_eq!(entry.broadcast.source_id.as_deref(), Some("pa:film"));
    assert_eq!(entry.item.broadcasts.len(), 1);
    assert!(entry.item.broadcasts[0].same_slot(&entry.broadcast));
}

#[tokio::test]
async fn test_equivalent_path_uses_representative_broadcast() {
    let lineup = lineup();
    let executor = EquivalentScheduleQueryExecutor::with_defaults(
        lineup.clone(),
        lineup,
        &LineupConfig::for_testing(),
    );
    let query = morning("pa", &[2], precedence_context(&["bbc", "pa"]));

    let schedule = executor.execute(&query).await.unwrap().single().unwrap();

    let entry = &schedule.entries[0];
    assert_eq!(entry.item.title, "Film (BBC)");
    assert_eq!(entry.broadcast.source_id.as_deref(), Some("bbc:film"));
}

#[tokio::test]
async fn test_sources_outside_precedence_are_not_selected() {
    let lineup = lineup();
    let executor = EquivalentScheduleQueryExecutor::with_defaults(
        lineup.clone(),
        lineup,
        &LineupConfig::for_testing(),
    );
    let query = morning("pa", &[2], precedence_context(&["pa"]));

    let schedule = executor.execute(&query).await.unwrap().single().unwrap();

    assert_eq!(schedule.entries[0].item.title, "Film");
}
