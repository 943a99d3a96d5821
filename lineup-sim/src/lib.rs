//! Lineup Simulation - in-memory collaborators for schedule queries.
//!
//! [`SimulatedLineup`] implements every resolver trait of `lineup-core`
//! over a small in-memory catalogue of channels, items and equivalence
//! sets. Catalogues can be built in code or loaded from a JSON
//! [`ScheduleFixture`]. A [`ResponseProfile`] adds latency, seeded jitter
//! or failures to every call so executor timeouts and error paths can be
//! exercised deterministically.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use lineup_core::{EquivalentScheduleQueryExecutor, LineupConfig};
//! use lineup_sim::{ScheduleFixture, SimulatedLineup};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fixture = ScheduleFixture::load("fixtures/bbc.json")?;
//! let lineup = Arc::new(SimulatedLineup::from_fixture(fixture));
//! let executor = EquivalentScheduleQueryExecutor::with_defaults(
//!     lineup.clone(),
//!     lineup,
//!     &LineupConfig::for_development(),
//! );
//! # Ok(())
//! # }
//! ```

pub mod fixture;
pub mod profile;
pub mod store;

pub use fixture::{FixtureError, ScheduleFixture};
pub use profile::ResponseProfile;
pub use store::SimulatedLineup;
