//! Assignment engines.
//!
//! - [`BatchAssigner`]: one conflict-free mapping of every submitter per
//!   cycle, by randomized reject-and-retry.
//! - [`IncrementalAssigner`]: one reviewer per incoming review request, by
//!   least current load.
//! - [`LoadStats`]: workload spread of either result.

pub mod batch;
mod incremental;
mod kpi;

pub use batch::{BatchAssigner, BatchRequest, CycleMapping, DEFAULT_MAX_ATTEMPTS};
pub use incremental::IncrementalAssigner;
pub use kpi::LoadStats;
