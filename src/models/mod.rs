//! Course-staff domain models.
//!
//! Provides the data types shared by the batch and incremental assigners.
//!
//! # Domain Mappings
//!
//! | ta-assign | Homework cycle | Project cycle | Review request |
//! |-----------|----------------|---------------|----------------|
//! | Submitter | Student | Team | Pull request author |
//! | Reviewer | TA | TA | TA |
//! | Mapping | `homeworkNN.yaml` | `homeworkNN_teams_tas_mapping.yaml` | - |

mod assignment;
pub mod calendar;
mod conflict;
mod reviewer;

pub use assignment::{Assignment, Mapping};
pub use calendar::{ClassCalendar, ClassSession, ScheduleSection};
pub use conflict::ConflictTable;
pub use reviewer::{ReviewerRecord, Roster, SemesterInfo};
