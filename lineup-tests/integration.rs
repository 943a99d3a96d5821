//! Integration tests for Lineup
//!
//! These tests drive the query executors end to end against the in-memory
//! collaborators of `lineup-sim`, crossing the crate boundary the way a
//! real storage backend would.

#[path = "integration/common.rs"]
mod common;

#[path = "integration/fixture_queries.rs"]
mod fixture_queries;

#[path = "integration/equivalence_precedence.rs"]
mod equivalence_precedence;

#[path = "integration/override_consistency.rs"]
mod override_consistency;

#[path = "integration/resolution_timeouts.rs"]
mod resolution_timeouts;
