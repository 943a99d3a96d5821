use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{ExecutorConfig, LineupConfig, QueryConfig};
use crate::equivalence::{EquivalenceSelector, PrecedenceEquivalentsMerger};
use crate::errors::ScheduleQueryError;
use crate::executor::{
    QueryResult, ScheduleQueryExecutor, check_access, in_requested_order, into_result,
    merge_overrides, resolve_channels, selected_sources, with_timeout,
};
use crate::matcher::FlexibleBroadcastMatcher;
use crate::merger::{OverlayScheduleMerger, ScheduleMerger};
use crate::query::ScheduleQuery;
use crate::resolver::{ChannelResolver, EquivalentScheduleResolver};

/// Executor backed by an equivalence-aware schedule store.
///
/// Supports both end-bounded and count-bounded queries.
#[derive(Debug, Clone)]
pub struct EquivalentScheduleQueryExecutor {
    channels: Arc<dyn ChannelResolver>,
    schedules: Arc<dyn EquivalentScheduleResolver>,
    selector: EquivalenceSelector,
    merger: Arc<dyn ScheduleMerger>,
    executor_config: ExecutorConfig,
    query_config: QueryConfig,
}

impl EquivalentScheduleQueryExecutor {
    pub fn new(
        channels: Arc<dyn ChannelResolver>,
        schedules: Arc<dyn EquivalentScheduleResolver>,
        selector: EquivalenceSelector,
        merger: Arc<dyn ScheduleMerger>,
        config: &LineupConfig,
    ) -> Self {
        Self {
            channels,
            schedules,
            selector,
            merger,
            executor_config: config.executor.clone(),
            query_config: config.query.clone(),
        }
    }

    /// Precedence merging, configured broadcast matching and overlay merging.
    pub fn with_defaults(
        channels: Arc<dyn ChannelResolver>,
        schedules: Arc<dyn EquivalentScheduleResolver>,
        config: &LineupConfig,
    ) -> Self {
        let selector = EquivalenceSelector::new(
            Arc::new(PrecedenceEquivalentsMerger::new()),
            Arc::new(FlexibleBroadcastMatcher::from_config(&config.matcher)),
        );
        Self::new(
            channels,
            schedules,
            selector,
            Arc::new(OverlayScheduleMerger::new()),
            config,
        )
    }
}

#[async_trait]
impl ScheduleQueryExecutor for EquivalentScheduleQueryExecutor {
    async fn execute(&self, query: &ScheduleQuery) -> Result<QueryResult, ScheduleQueryError> {
        check_access(query)?;
        query.check_duration(self.query_config.max_query_duration)?;

        let channels = resolve_channels(
            self.channels.as_ref(),
            query,
            self.executor_config.channel_timeout,
        )
        .await?;

        let sources = selected_sources(query);
        let window = query.window();
        let limit = self.executor_config.schedule_timeout;
        let context = query.context();

        let primary = with_timeout(
            "schedule resolution",
            limit,
            self.schedules
                .resolve_schedules(&channels, window, query.publisher(), &sources),
        );

        let schedules = match query.override_publisher() {
            None => {
                let primary = primary.await?;
                in_requested_order(query, self.selector.select_schedule(&primary, context)?)
            }
            Some(override_publisher) => {
                let overrides = with_timeout(
                    "override schedule resolution",
                    limit,
                    self.schedules
                        .resolve_schedules(&channels, window, override_publisher, &sources),
                );
                let (primary, overrides) = tokio::try_join!(primary, overrides)?;

                let primary =
                    in_requested_order(query, self.selector.select_schedule(&primary, context)?);
                let overrides =
                    in_requested_order(query, self.selector.select_schedule(&overrides, context)?);
                merge_overrides(
                    self.merger.as_ref(),
                    query,
                    override_publisher,
                    primary,
                    overrides,
                )?
            }
        };

        info!(
            schedules = schedules.len(),
            overridden = query.override_publisher().is_some(),
            merged = context.merges_equivalents(),
            "Executed schedule query"
        );

        into_result(query, schedules)
    }
}
