//! CLI command implementations

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use lineup_core::model::{ChannelId, Publisher};
use lineup_core::{
    EquivalentScheduleQueryExecutor, LineupConfig, PrecedenceConfig, QueryContext, QueryResult,
    ScheduleQuery, ScheduleQueryExecutor, ScheduleResolverBackedExecutor, TimeBound,
};
use lineup_sim::{ResponseProfile, ScheduleFixture, SimulatedLineup};
use tracing::info;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve channel schedules from a fixture and print them as JSON
    Query(QueryArgs),
    /// Check a fixture file and summarize its contents
    Validate {
        /// Path to the fixture JSON
        fixture: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Path to the fixture JSON
    #[arg(short, long)]
    pub fixture: PathBuf,

    /// Channel id; repeat for a multi-channel query
    #[arg(short, long = "channel", required = true)]
    pub channels: Vec<u64>,

    /// Publisher whose schedule is requested
    #[arg(short, long)]
    pub publisher: String,

    /// Window start (RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    pub from: DateTime<Utc>,

    /// Window end (RFC 3339)
    #[arg(long, value_parser = parse_instant, conflicts_with = "count")]
    pub to: Option<DateTime<Utc>>,

    /// Number of broadcasts from the window start
    #[arg(long)]
    pub count: Option<usize>,

    /// Publisher whose schedule is overlaid on the primary one
    #[arg(long = "override")]
    pub override_publisher: Option<String>,

    /// Readable publishers in precedence order; enables equivalence merging
    #[arg(long, value_delimiter = ',')]
    pub precedence: Vec<String>,

    /// Skip equivalence merging even with precedence enabled
    #[arg(long)]
    pub non_merged: bool,

    /// Use the plain schedule store instead of the equivalence-aware one
    #[arg(long)]
    pub plain: bool,
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|instant| instant.with_timezone(&Utc))
}

/// Handle the CLI command
///
/// # Errors
/// Returns the fixture, query or execution error of the failing command
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Query(args) => {
            let result = run_query(&args).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Commands::Validate { fixture } => validate_fixture(fixture),
    }
}

/// Builds the query described by the command-line flags.
///
/// Without `--precedence` the publisher and override publisher are the only
/// readable sources and equivalence merging stays off.
///
/// # Errors
/// - Neither `--to` nor `--count` given
/// - Query validation rejects the window or the channel list
pub fn build_query(args: &QueryArgs) -> anyhow::Result<ScheduleQuery> {
    let bound = match (args.to, args.count) {
        (Some(end), _) => TimeBound::End(end),
        (None, Some(count)) => TimeBound::Count(count),
        (None, None) => bail!("Either --to or --count is required"),
    };

    let publisher = Publisher::new(&args.publisher);
    let override_publisher = args.override_publisher.as_deref().map(Publisher::new);

    let sources = if args.precedence.is_empty() {
        PrecedenceConfig::without_precedence(
            std::iter::once(publisher.clone()).chain(override_publisher.clone()),
        )
    } else {
        PrecedenceConfig::with_precedence(args.precedence.iter().map(Publisher::new))
    };
    let mut context = QueryContext::new(sources);
    if args.non_merged {
        context = context.non_merged();
    }

    let query = match args.channels.as_slice() {
        [channel] => {
            ScheduleQuery::single(publisher, ChannelId::new(*channel), args.from, bound, context)?
        }
        channels => ScheduleQuery::multi(
            publisher,
            channels.iter().copied().map(ChannelId::new),
            args.from,
            bound,
            context,
        )?,
    };

    Ok(match override_publisher {
        Some(override_publisher) => query.with_override(override_publisher),
        None => query,
    })
}

/// Loads the fixture and executes the query against it.
///
/// # Errors
/// - Fixture cannot be loaded
/// - Query is invalid or execution fails
pub async fn run_query(args: &QueryArgs) -> anyhow::Result<QueryResult> {
    let config = LineupConfig::from_env();
    let fixture = ScheduleFixture::load(&args.fixture)?;
    let lineup = Arc::new(
        SimulatedLineup::from_fixture(fixture)
            .with_profile(ResponseProfile::from_config(&config.simulation)),
    );

    let executor: Arc<dyn ScheduleQueryExecutor> = if args.plain {
        Arc::new(ScheduleResolverBackedExecutor::new(
            lineup.clone(),
            lineup.clone(),
            lineup,
            &config,
        ))
    } else {
        Arc::new(EquivalentScheduleQueryExecutor::with_defaults(
            lineup.clone(),
            lineup,
            &config,
        ))
    };

    let query = build_query(args)?;
    info!(
        fixture = %args.fixture.display(),
        plain = args.plain,
        "Running schedule query"
    );

    match executor.execute(&query).await {
        Ok(result) => Ok(result),
        Err(error) if error.is_user_error() => bail!("{}", error.user_message()),
        Err(error) => Err(error).context("Schedule query failed"),
    }
}

/// Prints a short summary of a fixture file.
///
/// # Errors
/// - Fixture cannot be read, parsed or validated
pub fn validate_fixture(path: PathBuf) -> anyhow::Result<()> {
    let fixture = ScheduleFixture::load(&path)?;
    let broadcasts: usize = fixture.items.iter().map(|item| item.broadcasts.len()).sum();

    println!("Fixture {} is valid", path.display());
    println!("  Channels: {}", fixture.channels.len());
    println!("  Items: {} ({broadcasts} broadcasts)", fixture.items.len());
    println!("  Equivalence sets: {}", fixture.equivalences.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use lineup_core::model::{Broadcast, Channel, Item};
    use tempfile::NamedTempFile;

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    fn args(fixture: PathBuf) -> QueryArgs {
        QueryArgs {
            fixture,
            channels: vec![1],
            publisher: "pa".to_string(),
            from: at(9, 0),
            to: Some(at(12, 0)),
            count: None,
            override_publisher: None,
            precedence: Vec::new(),
            non_merged: false,
            plain: false,
        }
    }

    fn fixture_file() -> NamedTempFile {
        let broadcast = |start, end| Broadcast::new(ChannelId::new(1), start, end).unwrap();
        let fixture = ScheduleFixture {
            channels: vec![Channel::new(1, "one")],
            items: vec![
                Item::new(1, Publisher::new("pa"), "news")
                    .with_broadcast(broadcast(at(9, 0), at(10, 0))),
                Item::new(2, Publisher::new("ebs"), "match")
                    .with_broadcast(broadcast(at(9, 30), at(9, 45))),
            ],
            equivalences: Vec::new(),
        };
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), fixture.to_json().unwrap()).unwrap();
        file
    }

    #[test]
    fn test_instants_parse_with_offsets() {
        let parsed = parse_instant("2024-03-01T10:00:00+01:00").unwrap();
        assert_eq!(parsed, at(9, 0));
        assert!(parse_instant("yesterday").is_err());
    }

    #[test]
    fn test_query_needs_an_end_or_count() {
        let mut args = args(PathBuf::from("unused.json"));
        args.to = None;

        assert!(build_query(&args).is_err());

        args.count = Some(3);
        let query = build_query(&args).unwrap();
        assert_eq!(query.count(), Some(3));
    }

    #[test]
    fn test_sources_default_to_requested_publishers() {
        let mut args = args(PathBuf::from("unused.json"));
        args.override_publisher = Some("ebs".to_string());

        let query = build_query(&args).unwrap();

        let sources = &query.context().sources;
        assert!(!sources.precedence_enabled);
        assert_eq!(
            sources.enabled_read_sources,
            vec![Publisher::new("pa"), Publisher::new("ebs")]
        );
        assert_eq!(query.override_publisher(), Some(&Publisher::new("ebs")));
    }

    #[test]
    fn test_repeated_channels_build_multi_query() {
        let mut args = args(PathBuf::from("unused.json"));
        args.channels = vec![2, 1];
        args.precedence = vec!["pa".to_string()];

        let query = build_query(&args).unwrap();

        assert!(query.is_multi_channel());
        assert!(query.context().merges_equivalents());
    }

    #[tokio::test]
    async fn test_override_query_runs_against_fixture_file() {
        let file = fixture_file();
        let mut args = args(file.path().to_path_buf());
        args.override_publisher = Some("ebs".to_string());

        let schedule = run_query(&args).await.unwrap().single().unwrap();

        let titles: Vec<&str> = schedule
            .entries
            .iter()
            .map(|entry| entry.item.title.as_str())
            .collect();
        assert_eq!(titles, vec!["news", "match"]);
    }

    #[tokio::test]
    async fn test_user_errors_use_friendly_message() {
        let file = fixture_file();
        let mut args = args(file.path().to_path_buf());
        args.channels = vec![9];

        let error = run_query(&args).await.unwrap_err();

        assert_eq!(error.to_string(), "Unknown channel 9");
    }

    #[test]
    fn test_validate_rejects_missing_file() {
        assert!(validate_fixture(PathBuf::from("/nonexistent/lineup.json")).is_err());
    }
}
