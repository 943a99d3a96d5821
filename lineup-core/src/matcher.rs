//! Matching a schedule slot's broadcast against an item's own broadcasts.
//!
//! When equivalence selection swaps the content of a slot for another
//! publisher's item, the broadcast attached to the slot is re-picked from
//! that item. A miss means the caller keeps the slot's original broadcast:
//! content substitution never moves the advertised air time.

use chrono::Duration;

use crate::config::MatcherConfig;
use crate::model::Broadcast;

/// Picks the candidate broadcast corresponding to a reference broadcast.
pub trait BroadcastMatcher: Send + Sync + std::fmt::Debug {
    /// Returns the best candidate for `reference`, or `None`.
    fn find_matching_broadcast(
        &self,
        reference: &Broadcast,
        candidates: &[Broadcast],
    ) -> Option<Broadcast>;
}

/// Matches broadcasts on the same channel whose start (and optionally end)
/// instants lie within a tolerance of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexibleBroadcastMatcher {
    start_flexibility: Duration,
    end_flexibility: Option<Duration>,
}

impl FlexibleBroadcastMatcher {
    /// Tolerates `start_flexibility` at the start; ends are not compared.
    pub fn new(start_flexibility: Duration) -> Self {
        Self {
            start_flexibility,
            end_flexibility: None,
        }
    }

    /// Tolerates differences at both the start and the end.
    pub fn with_end_flexibility(start_flexibility: Duration, end_flexibility: Duration) -> Self {
        Self {
            start_flexibility,
            end_flexibility: Some(end_flexibility),
        }
    }

    /// Requires identical start instants; ends are not compared.
    pub fn exact_start() -> Self {
        Self::new(Duration::zero())
    }

    /// Requires identical start and end instants.
    pub fn exact_start_end() -> Self {
        Self::with_end_flexibility(Duration::zero(), Duration::zero())
    }

    pub fn from_config(config: &MatcherConfig) -> Self {
        Self {
            start_flexibility: config.start_flexibility,
            end_flexibility: config.end_flexibility,
        }
    }

    /// Symmetric tolerance check between two broadcasts.
    pub fn matches(&self, a: &Broadcast, b: &Broadcast) -> bool {
        if a.channel_id != b.channel_id {
            return false;
        }

        let start_delta = (a.transmission_time - b.transmission_time).abs();
        if start_delta > self.start_flexibility {
            return false;
        }

        match self.end_flexibility {
            Some(flexibility) => {
                (a.transmission_end_time - b.transmission_end_time).abs() <= flexibility
            }
            None => true,
        }
    }
}

impl Default for FlexibleBroadcastMatcher {
    fn default() -> Self {
        Self::from_config(&MatcherConfig::default())
    }
}

impl BroadcastMatcher for FlexibleBroadcastMatcher {
    fn find_matching_broadcast(
        &self,
        reference: &Broadcast,
        candidates: &[Broadcast],
    ) -> Option<Broadcast> {
        candidates
            .iter()
            .find(|candidate| candidate.same_slot(reference))
            .or_else(|| {
                candidates
                    .iter()
                    .find(|candidate| self.matches(reference, candidate))
            })
            .cloned()
    }
}
