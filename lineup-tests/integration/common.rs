//! Shared fixtures for the integration suite.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use lineup_core::model::{ChannelId, Publisher};
use lineup_core::{PrecedenceConfig, QueryContext, ScheduleQuery, TimeBound};
use lineup_sim::{ScheduleFixture, SimulatedLineup};

/// Two channels of press listings, a sports override on channel 1 and a
/// broadcaster's own copy of the evening film.
pub const LISTINGS: &str = r#"{
  "channels": [
    { "id": 1, "key": "bbcone", "title": "BBC One" },
    { "id": 2, "key": "bbctwo", "title": "BBC Two" }
  ],
  "items": [
    {
      "id": 10, "publisher": "pa", "title": "Breakfast",
      "broadcasts": [
        { "channel_id": 1, "transmission_time": "2024-03-01T09:00:00Z", "transmission_end_time": "2024-03-01T10:00:00Z" },
        { "channel_id": 1, "transmission_time": "2024-03-01T10:00:00Z", "transmission_end_time": "2024-03-01T10:00:00Z" }
      ]
    },
    {
      "id": 11, "publisher": "pa", "title": "Homes Under the Hammer",
      "broadcasts": [
        { "channel_id": 1, "transmission_time": "2024-03-01T10:00:00Z", "transmission_end_time": "2024-03-01T11:00:00Z" }
      ]
    },
    {
      "id": 12, "publisher": "pa", "title": "Film",
      "broadcasts": [
        { "channel_id": 2, "transmission_time": "2024-03-01T09:00:00Z", "transmission_end_time": "2024-03-01T11:00:00Z", "source_id": "pa:film" }
      ]
    },
    {
      "id": 20, "publisher": "ebs", "title": "Live Football",
      "broadcasts": [
        { "channel_id": 1, "transmission_time": "2024-03-01T09:30:00Z", "transmission_end_time": "2024-03-01T09:45:00Z" }
      ]
    },
    {
      "id": 30, "publisher": "bbc", "title": "Film (BBC)",
      "broadcasts": [
        { "channel_id": 2, "transmission_time": "2024-03-01T09:00:00Z", "transmission_end_time": "2024-03-01T11:00:00Z", "source_id": "bbc:film" }
      ]
    }
  ],
  "equivalences": [[12, 30]]
}"#;

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
}

pub fn lineup() -> Arc<SimulatedLineup> {
    let fixture = ScheduleFixture::from_json(LISTINGS).unwrap();
    Arc::new(SimulatedLineup::from_fixture(fixture))
}

/// Context reading `sources` without equivalence merging.
pub fn plain_context(sources: &[&str]) -> QueryContext {
    QueryContext::new(PrecedenceConfig::without_precedence(
        sources.iter().copied().map(Publisher::new),
    ))
}

/// Context merging equivalents by `precedence`.
pub fn precedence_context(precedence: &[&str]) -> QueryContext {
    QueryContext::new(PrecedenceConfig::with_precedence(
        precedence.iter().copied().map(Publisher::new),
    ))
}

/// Morning window query on `channels` for `publisher`.
pub fn morning(publisher: &str, channels: &[u64], context: QueryContext) -> ScheduleQuery {
    let bound = TimeBound::End(at(12, 0));
    match channels {
        [channel] => ScheduleQuery::single(
            Publisher::new(publisher),
            ChannelId::new(*channel),
            at(9, 0),
            bound,
            context,
        ),
        _ => ScheduleQuery::multi(
            Publisher::new(publisher),
            channels.iter().copied().map(ChannelId::new),
            at(9, 0),
            bound,
            context,
        ),
    }
    .unwrap()
}
