//! Schedule data model.
//!
//! All values are immutable for the duration of a query. Merging and
//! selection always build new entries instead of mutating their inputs,
//! since the same resolved broadcast may be shared by concurrent queries.

mod broadcast;
mod channel;
mod content;
mod interval;
mod publisher;
mod schedule;

pub use broadcast::Broadcast;
pub use channel::{Channel, ChannelId};
pub use content::{Item, ItemAndBroadcast, ItemId};
pub use interval::{Interval, InvertedInterval};
pub use publisher::Publisher;
pub use schedule::{
    ChannelSchedule, EquivalentChannelSchedule, EquivalentSchedule, EquivalentScheduleEntry,
    Schedule,
};
