//! Lineup Core - channel schedule resolution and merging
//!
//! Resolves the broadcast schedule of one or more channels for a publisher,
//! optionally overlays a second publisher's schedule on top of it, and
//! collapses equivalent content from several publishers to one item per
//! broadcast slot. Storage backends are reached through the traits in
//! [`resolver`].

pub mod config;
pub mod equivalence;
pub mod errors;
pub mod executor;
pub mod matcher;
pub mod merger;
pub mod model;
pub mod query;
pub mod resolver;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::LineupConfig;
pub use errors::{QueryError, ResolverError, ScheduleQueryError};
pub use executor::{
    EquivalentScheduleQueryExecutor, QueryResult, ScheduleQueryExecutor,
    ScheduleResolverBackedExecutor,
};
pub use merger::{MergeError, OverlayScheduleMerger, ScheduleMerger};
pub use query::{ChannelScope, PrecedenceConfig, QueryContext, ScheduleQuery, TimeBound};

pub type Result<T> = std::result::Result<T, ScheduleQueryError>;
