//! Centralized configuration for Lineup.
//!
//! Timeouts, query limits and matcher tolerances live here instead of
//! being scattered as literals through the executors.

use std::time::Duration;

/// Central configuration for all Lineup components.
#[derive(Debug, Clone, Default)]
pub struct LineupConfig {
    pub executor: ExecutorConfig,
    pub query: QueryConfig,
    pub matcher: MatcherConfig,
    pub simulation: SimulationConfig,
}

/// Bounds on collaborator calls made while executing a query.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Wait limit for channel resolution
    pub channel_timeout: Duration,
    /// Wait limit for each schedule resolution branch
    pub schedule_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            channel_timeout: Duration::from_secs(60),
            schedule_timeout: Duration::from_secs(60),
        }
    }
}

/// Limits applied to incoming schedule queries.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Longest end-bounded window a query may ask for
    pub max_query_duration: chrono::Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_query_duration: chrono::Duration::days(1),
        }
    }
}

/// Tolerances used when re-attaching broadcasts to selected content.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    pub start_flexibility: chrono::Duration,
    /// `None` skips the end comparison entirely
    pub end_flexibility: Option<chrono::Duration>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            start_flexibility: chrono::Duration::zero(),
            end_flexibility: Some(chrono::Duration::zero()),
        }
    }
}

/// Behaviour of the in-memory collaborators.
#[derive(Debug, Clone, Default)]
pub struct SimulationConfig {
    /// Delay added before every simulated response
    pub response_delay: Duration,
    /// When set, every simulated call fails with this reason
    pub failure: Option<String>,
}

impl SimulationConfig {
    /// Immediate, always-successful responses.
    pub fn deterministic_testing() -> Self {
        Self::default()
    }

    /// Responses delayed like a nearby document store.
    pub fn realistic_simulation() -> Self {
        Self {
            response_delay: Duration::from_millis(50),
            failure: None,
        }
    }
}

impl LineupConfig {
    /// Creates configuration with environment variable overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(timeout) = std::env::var("LINEUP_CHANNEL_TIMEOUT_SECS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.executor.channel_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(timeout) = std::env::var("LINEUP_SCHEDULE_TIMEOUT_SECS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.executor.schedule_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(hours) = std::env::var("LINEUP_MAX_QUERY_HOURS") {
            if let Some(duration) = parse_query_hours(&hours) {
                config.query.max_query_duration = duration;
            }
        }

        if let Ok(delay) = std::env::var("LINEUP_SIMULATED_DELAY_MS") {
            if let Ok(millis) = delay.parse::<u64>() {
                config.simulation.response_delay = Duration::from_millis(millis);
            }
        }

        config
    }

    /// Short timeouts and instant simulated responses.
    pub fn for_testing() -> Self {
        Self {
            executor: ExecutorConfig {
                channel_timeout: Duration::from_secs(1),
                schedule_timeout: Duration::from_secs(1),
            },
            simulation: SimulationConfig::deterministic_testing(),
            ..Default::default()
        }
    }

    /// Default limits with realistic simulated latency.
    pub fn for_development() -> Self {
        Self {
            simulation: SimulationConfig::realistic_simulation(),
            ..Default::default()
        }
    }
}

/// Positive whole hours that fit a `chrono::Duration`.
fn parse_query_hours(value: &str) -> Option<chrono::Duration> {
    value
        .parse::<i64>()
        .ok()
        .filter(|hours| *hours > 0)
        .and_then(chrono::Duration::try_hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = LineupConfig::default();

        assert_eq!(config.executor.channel_timeout, Duration::from_secs(60));
        assert_eq!(config.executor.schedule_timeout, Duration::from_secs(60));
        assert_eq!(config.query.max_query_duration, chrono::Duration::days(1));
        assert_eq!(config.matcher.end_flexibility, Some(chrono::Duration::zero()));
        assert!(config.simulation.failure.is_none());
    }

    #[test]
    fn test_config_presets() {
        let testing = LineupConfig::for_testing();
        assert_eq!(testing.executor.channel_timeout, Duration::from_secs(1));
        assert_eq!(testing.simulation.response_delay, Duration::ZERO);

        let development = LineupConfig::for_development();
        assert!(development.simulation.response_delay > Duration::ZERO);
        assert_eq!(development.executor.schedule_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_query_hours_must_be_positive_and_representable() {
        assert_eq!(parse_query_hours("48"), Some(chrono::Duration::hours(48)));
        assert_eq!(parse_query_hours("0"), None);
        assert_eq!(parse_query_hours("-5"), None);
        assert_eq!(parse_query_hours("9999999999999999"), None);
        assert_eq!(parse_query_hours("abc"), None);
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("LINEUP_CHANNEL_TIMEOUT_SECS", "5");
            std::env::set_var("LINEUP_SCHEDULE_TIMEOUT_SECS", "7");
            std::env::set_var("LINEUP_MAX_QUERY_HOURS", "48");
            std::env::set_var("LINEUP_SIMULATED_DELAY_MS", "not-a-number");
        }

        let config = LineupConfig::from_env();

        assert_eq!(config.executor.channel_timeout, Duration::from_secs(5));
        assert_eq!(config.executor.schedule_timeout, Duration::from_secs(7));
        assert_eq!(config.query.max_query_duration, chrono::Duration::hours(48));
        assert_eq!(config.simulation.response_delay, Duration::ZERO);

        unsafe {
            std::env::remove_var("LINEUP_CHANNEL_TIMEOUT_SECS");
            std::env::remove_var("LINEUP_SCHEDULE_TIMEOUT_SECS");
            std::env::remove_var("LINEUP_MAX_QUERY_HOURS");
            std::env::remove_var("LINEUP_SIMULATED_DELAY_MS");
        }
    }
}
