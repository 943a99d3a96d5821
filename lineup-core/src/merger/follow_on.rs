//! Fate of follow-on entries trailing an original that met an override.

use chrono::{DateTime, Utc};

use crate::model::ItemAndBroadcast;

/// Carried from an original entry to the follow-ons directly after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum FollowOnState {
    /// Preceding original was kept whole; follow-ons keep their times
    #[default]
    Normal,
    /// Preceding original was shadowed by an override
    Suppress,
    /// Preceding original was cut at this override boundary
    TruncateTo(DateTime<Utc>),
}

impl FollowOnState {
    /// Entry to emit for `follow_on`, if any.
    pub(crate) fn apply(self, follow_on: &ItemAndBroadcast) -> Option<ItemAndBroadcast> {
        match self {
            FollowOnState::Normal => Some(follow_on.clone()),
            FollowOnState::Suppress => None,
            FollowOnState::TruncateTo(boundary) => Some(follow_on.retimed(boundary, boundary)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::model::{Broadcast, ChannelId, Item, Publisher};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    fn follow_on() -> ItemAndBroadcast {
        let broadcast = Broadcast::new(ChannelId::new(1), at(10, 0), at(10, 0))
            .unwrap()
            .with_source_id("pa:fo");
        ItemAndBroadcast::new(
            Item::new(1, Publisher::new("pa"), "A").with_broadcast(broadcast.clone()),
            broadcast,
        )
    }

    #[test]
    fn test_default_is_normal() {
        assert_eq!(FollowOnState::default(), FollowOnState::Normal);
    }

    #[test]
    fn test_normal_keeps_follow_on() {
        assert_eq!(FollowOnState::Normal.apply(&follow_on()), Some(follow_on()));
    }

    #[test]
    fn test_suppress_drops_follow_on() {
        assert_eq!(FollowOnState::Suppress.apply(&follow_on()), None);
    }

    #[test]
    fn test_truncate_collapses_to_boundary() {
        let collapsed = FollowOnState::TruncateTo(at(9, 30))
            .apply(&follow_on())
            .unwrap();

        assert_eq!(collapsed.start(), at(9, 30));
        assert_eq!(collapsed.end(), at(9, 30));
        assert_eq!(collapsed.broadcast.source_id.as_deref(), Some("pa:fo"));
        assert_eq!(collapsed.item, follow_on().item);
    }
}
