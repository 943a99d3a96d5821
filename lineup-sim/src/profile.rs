//! Latency and failure injection for simulated resolvers.

use std::time::Duration;

use lineup_core::ResolverError;
use lineup_core::config::SimulationConfig;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// How a simulated collaborator answers each call.
#[derive(Debug)]
pub struct ResponseProfile {
    delay: Duration,
    jitter: Option<Jitter>,
    failure: Option<String>,
}

#[derive(Debug)]
struct Jitter {
    max: Duration,
    rng: Mutex<ChaCha8Rng>,
}

impl ResponseProfile {
    /// Answers immediately and never fails.
    pub fn instant() -> Self {
        Self {
            delay: Duration::ZERO,
            jitter: None,
            failure: None,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            delay: config.response_delay,
            jitter: None,
            failure: config.failure.clone(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Adds up to `max` of extra delay drawn from a generator seeded with `seed`.
    pub fn with_jitter(mut self, max: Duration, seed: u64) -> Self {
        self.jitter = Some(Jitter {
            max,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        });
        self
    }

    /// Makes every call fail as unavailable.
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Delay for the next call.
    pub fn next_delay(&self) -> Duration {
        let extra = self.jitter.as_ref().map_or(Duration::ZERO, |jitter| {
            let max_millis = u64::try_from(jitter.max.as_millis()).unwrap_or(u64::MAX);
            Duration::from_millis(jitter.rng.lock().random_range(0..=max_millis))
        });
        self.delay + extra
    }

    /// Waits out the simulated latency, then applies failure injection.
    ///
    /// # Errors
    /// - `ResolverError::Unavailable` - Profile is configured to fail
    pub async fn respond(&self, resolver: &'static str) -> Result<(), ResolverError> {
        let delay = self.next_delay();
        if !delay.is_zero() {
            debug!(resolver, ?delay, "Simulating response latency");
            tokio::time::sleep(delay).await;
        }

        match &self.failure {
            Some(reason) => Err(ResolverError::Unavailable {
                resolver,
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for ResponseProfile {
    fn default() -> Self {
        Self::instant()
    }
}
