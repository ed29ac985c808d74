//! Conflict-aware reviewer assignment for course staff.
//!
//! Pairs submitters (students or teams) with reviewers (teaching
//! assistants) so that nobody reviews a submitter they have a declared
//! conflict with, and keeps review-request workload balanced across runs.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Assignment`, `Mapping`, `ConflictTable`,
//!   `ReviewerRecord`, `Roster`, `ClassCalendar`
//! - **`scheduler`**: `BatchAssigner` (randomized conflict-free mapping per
//!   cycle), `IncrementalAssigner` (least-loaded pick), `LoadStats`
//! - **`ledger`**: Persisted reviewer → count ledger with pluggable storage
//! - **`publish`**: `ReviewPublisher` and its GitHub implementation
//! - **`review`**: One review-request cycle: select, persist, publish
//! - **`validation`**: Roster and submitter integrity checks
//! - **`files`**, **`config`**, **`office_hours`**: Course repository I/O
//!
//! # Architecture
//!
//! The two assignment modes share the conflict model and nothing else. Batch
//! runs are stateless; incremental runs read and write the ledger, which is
//! committed before anything reaches the review platform.

pub mod config;
pub mod error;
pub mod files;
pub mod ledger;
pub mod models;
pub mod office_hours;
pub mod publish;
pub mod review;
pub mod scheduler;
pub mod validation;

pub use error::{AssignError, CalendarError, InputError, PublishError, StorageError};
