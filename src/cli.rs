use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Conflict-aware TA reviewer assignment.
///
/// Generates per-homework reviewer mappings, assigns reviewers to incoming
/// pull requests by workload, and dates the course schedule.
#[derive(Parser, Debug)]
#[command(name = "ta-assign", version, about = "Conflict-aware TA reviewer assignment")]
pub struct CliArgs {
    /// Path to a YAML config file (defaults follow the course repository layout)
    #[arg(long, global = true, env = "TA_ASSIGN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Staff roster override
    #[arg(long, global = true)]
    pub roster: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write one conflict-free mapping file per homework cycle
    Batch(BatchArgs),
    /// Pick the least-loaded reviewer for a pull request and publish it
    Assign(AssignArgs),
    /// Stamp class sessions in the schedule with concrete dates
    Schedule(ScheduleArgs),
    /// Group staff office hours by day
    OfficeHours(OfficeHoursArgs),
    /// Print the review-request ledger with load statistics
    Ledger(LedgerArgs),
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Assign teams (unique values of the team column) instead of students
    #[arg(long)]
    pub teams: bool,

    /// Submitter CSV override
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Column holding submitter identities
    #[arg(long)]
    pub column: Option<String>,

    /// Output directory override
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// First cycle number
    #[arg(long)]
    pub first: Option<u32>,

    /// Number of cycles
    #[arg(long)]
    pub count: Option<u32>,

    /// Retry cap per cycle
    #[arg(long)]
    pub max_attempts: Option<usize>,

    /// Seed for reproducible mappings
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: String,

    /// Pull request number
    #[arg(long)]
    pub pr: u64,

    /// Ledger file override
    #[arg(long)]
    pub ledger: Option<PathBuf>,

    /// Add roster members missing from the ledger (at zero) before assigning
    #[arg(long)]
    pub enroll_new: bool,

    /// Persist the ledger but only log what would be published
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Schedule YAML to read
    #[arg(long)]
    pub schedule: Option<PathBuf>,

    /// First day of the semester (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Date with no class (YYYY-MM-DD); repeatable
    #[arg(long = "break")]
    pub breaks: Vec<NaiveDate>,

    /// Weekday classes meet on; repeatable (defaults to the configured days)
    #[arg(long = "class-day")]
    pub class_days: Vec<String>,

    /// Where to write the dated schedule
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct OfficeHoursArgs {
    /// Semester info YAML with a `TAs` map
    #[arg(long)]
    pub semester_info: Option<PathBuf>,

    /// Where to write the office-hours table (stdout if omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// Ledger file override
    #[arg(long)]
    pub ledger: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_schedule() {
        let args = CliArgs::parse_from([
            "ta-assign", "schedule", "--start", "2025-01-13", "--break", "2025-01-20",
            "--break", "2025-03-10", "--class-day", "Tuesday",
        ]);
        match args.command {
            Command::Schedule(s) => {
                assert_eq!(s.breaks.len(), 2);
                assert_eq!(s.class_days, vec!["Tuesday"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_assign() {
        let args = CliArgs::parse_from([
            "ta-assign", "--roster", "tas.yaml", "assign", "--repo", "course/hw1-bob", "--pr",
            "12", "--dry-run",
        ]);
        assert_eq!(args.roster, Some(PathBuf::from("tas.yaml")));
        match args.command {
            Command::Assign(a) => {
                assert_eq!((a.repo.as_str(), a.pr), ("course/hw1-bob", 12));
                assert!(a.dry_run && !a.enroll_new);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
