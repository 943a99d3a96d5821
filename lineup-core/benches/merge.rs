use std::hint::black_box;

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lineup_core::merger::{OverlayScheduleMerger, ScheduleMerger};
use lineup_core::model::{
    Broadcast, Channel, ChannelId, ChannelSchedule, Interval, Item, ItemAndBroadcast, Publisher,
};

fn day_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// `slots` back-to-back entries of `minutes` each, every third with a follow-on.
fn schedule(publisher: &str, offset: i64, minutes: i64, slots: usize) -> ChannelSchedule {
    let channel = ChannelId::new(1);
    let publisher = Publisher::new(publisher);
    let mut start = day_start() + Duration::minutes(offset);
    let mut entries = Vec::with_capacity(slots * 2);

    for index in 0..slots {
        let end = start + Duration::minutes(minutes);
        let Ok(broadcast) = Broadcast::new(channel, start, end) else {
            break;
        };
        let item = Item::new(index as u64, publisher.clone(), format!("{publisher} {index}"));
        entries.push(ItemAndBroadcast::new(item.clone(), broadcast));
        if index % 3 == 0 {
            if let Ok(follow_on) = Broadcast::new(channel, end, end) {
                entries.push(ItemAndBroadcast::new(item, follow_on));
            }
        }
        start = end + Duration::minutes(offset);
    }

    let interval = Interval::new(day_start(), start).unwrap_or_else(|_| Interval::instant(day_start()));
    ChannelSchedule::new(Channel::new(1, "bench"), interval, entries)
}

fn bench_overlay_merge(c: &mut Criterion) {
    let merger = OverlayScheduleMerger::new();
    let mut group = c.benchmark_group("overlay_merge");

    for slots in [48, 288, 1440] {
        let original = schedule("pa", 0, 30, slots);
        let overrides = schedule("ebs", 45, 20, slots / 4);

        group.bench_with_input(BenchmarkId::from_parameter(slots), &slots, |b, _| {
            b.iter(|| merger.merge(black_box(&original), black_box(&overrides)))
        });
    }
    group.finish();
}

fn bench_identity_merge(c: &mut Criterion) {
    let merger = OverlayScheduleMerger::new();
    let original = schedule("pa", 0, 30, 288);
    let empty = ChannelSchedule::new(Channel::new(1, "bench"), original.interval, Vec::new());

    c.bench_function("overlay_merge_empty_override", |b| {
        b.iter(|| merger.merge(black_box(&original), black_box(&empty)))
    });
}

criterion_group!(benches, bench_overlay_merge, bench_identity_merge);
criterion_main!(benches);
