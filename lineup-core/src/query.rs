//! Schedule query model.
//!
//! A query targets either exactly one channel or an ordered set of
//! channels, and is bounded either by an end instant or by a broadcast
//! count. Both distinctions are fixed at construction. Code that needs
//! the single channel id has to match on [`ChannelScope`], so asking a
//! multi-channel query for "its" channel cannot compile.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::QueryError;
use crate::model::{ChannelId, Interval, Publisher};

/// Smallest broadcast count a count-bounded query may ask for.
pub const MIN_COUNT: usize = 1;
/// Largest broadcast count a count-bounded query may ask for.
pub const MAX_COUNT: usize = 10;

/// Channels targeted by a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelScope {
    Single(ChannelId),
    /// Ordered, duplicate-free channel ids
    Multi(Vec<ChannelId>),
}

impl ChannelScope {
    /// Builds a multi-channel scope, dropping repeated ids but keeping order.
    ///
    /// # Errors
    /// - `QueryError::NoChannels` - `ids` is empty
    pub fn multi(ids: impl IntoIterator<Item = ChannelId>) -> Result<Self, QueryError> {
        let mut unique: Vec<ChannelId> = Vec::new();
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        if unique.is_empty() {
            return Err(QueryError::NoChannels);
        }
        Ok(ChannelScope::Multi(unique))
    }

    /// Every channel the executors must resolve, in request order, whatever
    /// the scope. Match on the scope to tell a single channel from a list.
    pub fn requested_ids(&self) -> &[ChannelId] {
        match self {
            ChannelScope::Single(id) => std::slice::from_ref(id),
            ChannelScope::Multi(ids) => ids,
        }
    }

    pub fn is_multi_channel(&self) -> bool {
        matches!(self, ChannelScope::Multi(_))
    }
}

/// Upper bound of a schedule query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeBound {
    /// Entries airing before this instant
    End(DateTime<Utc>),
    /// The first `n` broadcasts from the start instant
    Count(usize),
}

/// Window handed to schedule resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleWindow {
    Interval(Interval),
    Count { start: DateTime<Utc>, count: usize },
}

impl ScheduleWindow {
    pub fn start(&self) -> DateTime<Utc> {
        match self {
            ScheduleWindow::Interval(interval) => interval.start(),
            ScheduleWindow::Count { start, .. } => *start,
        }
    }
}

/// Caller's readable publishers, highest precedence first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrecedenceConfig {
    pub enabled_read_sources: Vec<Publisher>,
    pub precedence_enabled: bool,
}

impl PrecedenceConfig {
    /// Precedence-ordered sources with equivalence merging switched on.
    pub fn with_precedence(sources: impl IntoIterator<Item = Publisher>) -> Self {
        Self {
            enabled_read_sources: sources.into_iter().collect(),
            precedence_enabled: true,
        }
    }

    /// Readable sources without equivalence merging.
    pub fn without_precedence(sources: impl IntoIterator<Item = Publisher>) -> Self {
        Self {
            enabled_read_sources: sources.into_iter().collect(),
            precedence_enabled: false,
        }
    }

    pub fn is_read_enabled(&self, publisher: &Publisher) -> bool {
        self.enabled_read_sources.contains(publisher)
    }

    /// Rank of `publisher`; 0 is the highest precedence.
    pub fn rank_of(&self, publisher: &Publisher) -> Option<usize> {
        self.enabled_read_sources
            .iter()
            .position(|enabled| enabled == publisher)
    }
}

/// Per-request caller context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryContext {
    pub sources: PrecedenceConfig,
    /// Caller asked for unmerged content even with precedence on
    #[serde(default)]
    pub non_merged: bool,
}

impl QueryContext {
    pub fn new(sources: PrecedenceConfig) -> Self {
        Self {
            sources,
            non_merged: false,
        }
    }

    /// Requests unmerged content regardless of precedence.
    pub fn non_merged(mut self) -> Self {
        self.non_merged = true;
        self
    }

    /// Whether schedule entries should be collapsed to a representative item.
    pub fn merges_equivalents(&self) -> bool {
        self.sources.precedence_enabled && !self.non_merged
    }
}

/// Request for one or more channel schedules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleQuery {
    scope: ChannelScope,
    publisher: Publisher,
    override_publisher: Option<Publisher>,
    start: DateTime<Utc>,
    bound: TimeBound,
    context: QueryContext,
}

impl ScheduleQuery {
    /// Query for a single channel.
    ///
    /// # Errors
    /// - `QueryError::CountOutOfRange` - count outside `[MIN_COUNT, MAX_COUNT]`
    /// - `QueryError::EndNotAfterStart` / `QueryError::EmptyWindow` - bad end bound
    pub fn single(
        publisher: Publisher,
        channel_id: ChannelId,
        start: DateTime<Utc>,
        bound: TimeBound,
        context: QueryContext,
    ) -> Result<Self, QueryError> {
        Self::build(ChannelScope::Single(channel_id), publisher, start, bound, context)
    }

    /// Query for an ordered set of channels.
    ///
    /// # Errors
    /// - `QueryError::NoChannels` - `channel_ids` is empty
    /// - `QueryError::CountOutOfRange` - count outside `[MIN_COUNT, MAX_COUNT]`
    /// - `QueryError::EndNotAfterStart` / `QueryError::EmptyWindow` - bad end bound
    pub fn multi(
        publisher: Publisher,
        channel_ids: impl IntoIterator<Item = ChannelId>,
        start: DateTime<Utc>,
        bound: TimeBound,
        context: QueryContext,
    ) -> Result<Self, QueryError> {
        Self::build(ChannelScope::multi(channel_ids)?, publisher, start, bound, context)
    }

    fn build(
        scope: ChannelScope,
        publisher: Publisher,
        start: DateTime<Utc>,
        bound: TimeBound,
        context: QueryContext,
    ) -> Result<Self, QueryError> {
        match bound {
            TimeBound::End(end) => {
                let interval = Interval::new(start, end)?;
                if interval.is_empty() {
                    return Err(QueryError::EmptyWindow);
                }
            }
            TimeBound::Count(count) => {
                if !(MIN_COUNT..=MAX_COUNT).contains(&count) {
                    return Err(QueryError::CountOutOfRange {
                        count,
                        min: MIN_COUNT,
                        max: MAX_COUNT,
                    });
                }
            }
        }

        Ok(Self {
            scope,
            publisher,
            override_publisher: None,
            start,
            bound,
            context,
        })
    }

    /// Overlays `publisher`'s schedule on top of the primary one.
    pub fn with_override(mut self, publisher: Publisher) -> Self {
        self.override_publisher = Some(publisher);
        self
    }

    pub fn scope(&self) -> &ChannelScope {
        &self.scope
    }

    /// Channels to resolve, one for a single-channel query.
    pub fn requested_channel_ids(&self) -> &[ChannelId] {
        self.scope.requested_ids()
    }

    pub fn is_multi_channel(&self) -> bool {
        self.scope.is_multi_channel()
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    pub fn override_publisher(&self) -> Option<&Publisher> {
        self.override_publisher.as_ref()
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn bound(&self) -> TimeBound {
        self.bound
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        match self.bound {
            TimeBound::End(end) => Some(end),
            TimeBound::Count(_) => None,
        }
    }

    pub fn count(&self) -> Option<usize> {
        match self.bound {
            TimeBound::Count(count) => Some(count),
            TimeBound::End(_) => None,
        }
    }

    pub fn context(&self) -> &QueryContext {
        &self.context
    }

    /// Window to request from resolvers.
    pub fn window(&self) -> ScheduleWindow {
        match self.bound {
            TimeBound::End(end) => ScheduleWindow::Interval(
                Interval::new(self.start, end).unwrap_or_else(|_| Interval::instant(self.start)),
            ),
            TimeBound::Count(count) => ScheduleWindow::Count {
                start: self.start,
                count,
            },
        }
    }

    /// Checks an end-bounded window against `max_duration`.
    ///
    /// # Errors
    /// - `QueryError::WindowTooLong` - window exceeds `max_duration`
    pub fn check_duration(&self, max_duration: Duration) -> Result<(), QueryError> {
        match self.window() {
            ScheduleWindow::Interval(interval) if interval.duration() > max_duration => {
                Err(QueryError::WindowTooLong {
                    max_hours: max_duration.num_hours(),
                })
            }
            _ => Ok(()),
        }
    }
}
