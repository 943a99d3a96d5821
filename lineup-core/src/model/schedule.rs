//! Per-channel schedules, in resolved and equivalence-set form.

use serde::{Deserialize, Serialize};

use super::{Broadcast, Channel, Interval, Item, ItemAndBroadcast};

/// Time-ordered entries of one channel over an interval.
///
/// Entries are expected in start-time order. Base schedules do not
/// overlap; merged schedules may contain zero-length follow-on markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSchedule {
    pub channel: Channel,
    pub interval: Interval,
    pub entries: Vec<ItemAndBroadcast>,
}

impl ChannelSchedule {
    pub fn new(channel: Channel, interval: Interval, entries: Vec<ItemAndBroadcast>) -> Self {
        Self {
            channel,
            interval,
            entries,
        }
    }

    /// Copy of this schedule with `entries` replacing the current ones.
    pub fn with_entries(&self, entries: Vec<ItemAndBroadcast>) -> Self {
        Self {
            channel: self.channel.clone(),
            interval: self.interval,
            entries,
        }
    }

    /// Entries sorted into schedule order.
    pub fn sorted_entries(&self) -> Vec<ItemAndBroadcast> {
        let mut entries = self.entries.clone();
        entries.sort_by(ItemAndBroadcast::cmp_transmission);
        entries
    }
}

/// Channel schedules resolved for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub channel_schedules: Vec<ChannelSchedule>,
    pub interval: Interval,
}

impl Schedule {
    pub fn new(channel_schedules: Vec<ChannelSchedule>, interval: Interval) -> Self {
        Self {
            channel_schedules,
            interval,
        }
    }
}

/// Schedule slot whose content side is a set of equivalent items.
///
/// The broadcast belongs to the base schedule; the items may come from
/// several publishers and have not been collapsed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalentScheduleEntry {
    pub broadcast: Broadcast,
    pub items: Vec<Item>,
}

impl EquivalentScheduleEntry {
    pub fn new(broadcast: Broadcast, items: Vec<Item>) -> Self {
        Self { broadcast, items }
    }
}

/// One channel's schedule before equivalence selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalentChannelSchedule {
    pub channel: Channel,
    pub interval: Interval,
    pub entries: Vec<EquivalentScheduleEntry>,
}

impl EquivalentChannelSchedule {
    pub fn new(channel: Channel, interval: Interval, entries: Vec<EquivalentScheduleEntry>) -> Self {
        Self {
            channel,
            interval,
            entries,
        }
    }

    /// Keeps only the first `count` broadcasts in start-time order.
    ///
    /// The interval end narrows to the end of the last kept broadcast, so a
    /// count-bounded window reports the span it actually covers.
    pub fn with_limited_broadcasts(&self, count: usize) -> Self {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| a.broadcast.cmp_transmission(&b.broadcast));
        entries.truncate(count);

        let interval = match entries.last() {
            Some(last) if last.broadcast.transmission_end_time >= self.interval.start() => {
                Interval::new(self.interval.start(), last.broadcast.transmission_end_time)
                    .unwrap_or(self.interval)
            }
            _ => self.interval,
        };

        Self {
            channel: self.channel.clone(),
            interval,
            entries,
        }
    }
}

/// Equivalence-aware schedule for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalentSchedule {
    pub channel_schedules: Vec<EquivalentChannelSchedule>,
    pub interval: Interval,
}

impl EquivalentSchedule {
    pub fn new(channel_schedules: Vec<EquivalentChannelSchedule>, interval: Interval) -> Self {
        Self {
            channel_schedules,
            interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::model::{ChannelId, Publisher};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    fn entry(id: u64, start: DateTime<Utc>, end: DateTime<Utc>) -> EquivalentScheduleEntry {
        let broadcast = Broadcast::new(ChannelId::new(1), start, end).unwrap();
        let item = Item::new(id, Publisher::new("bbc.co.uk"), format!("item {id}"))
            .with_broadcast(broadcast.clone());
        EquivalentScheduleEntry::new(broadcast, vec![item])
    }

    #[test]
    fn test_with_limited_broadcasts() {
        let first = entry(1, at(9, 0), at(9, 30));
        let second = entry(2, at(9, 30), at(11, 30));
        let third = entry(3, at(11, 30), at(14, 0));
        let schedule = EquivalentChannelSchedule::new(
            Channel::new(1, "one"),
            Interval::new(at(9, 0), at(14, 0)).unwrap(),
            vec![third.clone(), second.clone(), first.clone()],
        );

        let one = schedule.with_limited_broadcasts(1);
        assert_eq!(one.entries, vec![first.clone()]);
        assert_eq!(one.interval.end(), at(9, 30));

        let two = schedule.with_limited_broadcasts(2);
        assert_eq!(two.entries, vec![first.clone(), second]);
        assert_eq!(two.interval.end(), at(11, 30));

        let all = schedule.with_limited_broadcasts(5);
        assert_eq!(all.entries.len(), 3);
        assert_eq!(all.interval.end(), at(14, 0));
    }

    #[test]
    fn test_limiting_empty_schedule_keeps_interval() {
        let interval = Interval::new(at(9, 0), at(10, 0)).unwrap();
        let schedule = EquivalentChannelSchedule::new(Channel::new(1, "one"), interval, vec![]);

        assert_eq!(schedule.with_limited_broadcasts(3).interval, interval);
    }
}
