//! Broadcast records: one airing of a content item on a channel.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{ChannelId, InvertedInterval, Interval};

/// Single transmission of an item on a channel.
///
/// A broadcast whose duration is zero is a follow-on: a continuation
/// marker appended to the end of the previous item's airing rather than a
/// new airing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Broadcast {
    pub channel_id: ChannelId,
    /// Start of transmission (inclusive)
    pub transmission_time: DateTime<Utc>,
    /// End of transmission (exclusive)
    pub transmission_end_time: DateTime<Utc>,
    /// Publisher-local broadcast identifier
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default = "default_actively_published")]
    pub actively_published: bool,
    #[serde(default)]
    pub repeat: bool,
}

fn default_actively_published() -> bool {
    true
}

impl Broadcast {
    /// Creates broadcast airing on `channel_id` over `[start, end)`.
    ///
    /// # Errors
    /// - `InvertedInterval` - `end` is before `start`
    pub fn new(
        channel_id: ChannelId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, InvertedInterval> {
        Interval::new(start, end)?;
        Ok(Self {
            channel_id,
            transmission_time: start,
            transmission_end_time: end,
            source_id: None,
            actively_published: true,
            repeat: false,
        })
    }

    /// Sets the publisher-local broadcast identifier.
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Marks the broadcast as a repeat airing.
    pub fn as_repeat(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn transmission_interval(&self) -> Interval {
        Interval::new(self.transmission_time, self.transmission_end_time)
            .unwrap_or_else(|_| Interval::instant(self.transmission_time))
    }

    pub fn duration(&self) -> Duration {
        self.transmission_end_time - self.transmission_time
    }

    pub fn is_follow_on(&self) -> bool {
        self.transmission_time == self.transmission_end_time
    }

    /// Copy of this broadcast re-timed to `[start, end)`, keeping all other fields.
    pub(crate) fn retimed(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(start <= end, "retimed broadcast must not be inverted");
        Self {
            transmission_time: start,
            transmission_end_time: end,
            ..self.clone()
        }
    }

    /// Schedule ordering: by start, then by end.
    pub fn cmp_transmission(&self, other: &Self) -> Ordering {
        self.transmission_time
            .cmp(&other.transmission_time)
            .then(self.transmission_end_time.cmp(&other.transmission_end_time))
    }

    /// Checks channel and transmission span equality, ignoring metadata.
    pub fn same_slot(&self, other: &Self) -> bool {
        self.channel_id == other.channel_id
            && self.transmission_time == other.transmission_time
            && self.transmission_end_time == other.transmission_end_time
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_zero_duration_is_follow_on() {
        let channel = ChannelId::new(1);
        let follow_on = Broadcast::new(channel, at(10, 0), at(10, 0)).unwrap();
        let airing = Broadcast::new(channel, at(9, 0), at(10, 0)).unwrap();

        assert!(follow_on.is_follow_on());
        assert!(!airing.is_follow_on());
        assert_eq!(airing.duration(), Duration::hours(1));
    }

    #[test]
    fn test_orders_by_start_then_end() {
        let channel = ChannelId::new(1);
        let marker = Broadcast::new(channel, at(9, 30), at(9, 30)).unwrap();
        let longer = Broadcast::new(channel, at(9, 30), at(10, 0)).unwrap();
        let earlier = Broadcast::new(channel, at(9, 0), at(11, 0)).unwrap();

        let mut broadcasts = vec![longer.clone(), marker.clone(), earlier.clone()];
        broadcasts.sort_by(Broadcast::cmp_transmission);

        assert_eq!(broadcasts, vec![earlier, marker, longer]);
    }

    #[test]
    fn test_retimed_keeps_metadata() {
        let original = Broadcast::new(ChannelId::new(7), at(9, 0), at(10, 0))
            .unwrap()
            .with_source_id("pa:123")
            .as_repeat();

        let prefix = original.retimed(at(9, 0), at(9, 30));

        assert_eq!(prefix.source_id.as_deref(), Some("pa:123"));
        assert!(prefix.repeat);
        assert_eq!(prefix.transmission_end_time, at(9, 30));
        assert!(!original.same_slot(&prefix));
    }
}
