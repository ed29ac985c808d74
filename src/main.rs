mod cli;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use ta_assign::config::{self, AppConfig, CycleRange};
use ta_assign::files;
use ta_assign::ledger::{JsonFileStore, LoadLedger};
use ta_assign::models::ClassCalendar;
use ta_assign::office_hours;
use ta_assign::publish::{DryRunPublisher, GitHubPublisher, ReviewPublisher, SubmissionRef};
use ta_assign::review::assign_review;
use ta_assign::scheduler::{BatchAssigner, BatchRequest, LoadStats};
use ta_assign::validation::validate_input;

use crate::cli::{
    AssignArgs, BatchArgs, CliArgs, Command, LedgerArgs, OfficeHoursArgs, ScheduleArgs,
};

/// Exit status when the ledger was committed but publishing failed.
const EXIT_PUBLISH_FAILED: u8 = 2;

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    config::load_dotenv();
    let args = CliArgs::parse();

    let mut config =
        AppConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(roster) = args.roster {
        config.roster_path = roster;
    }

    match args.command {
        Command::Batch(batch) => run_batch(&config, batch).map(|_| ExitCode::SUCCESS),
        Command::Assign(assign) => run_assign(&config, assign),
        Command::Schedule(schedule) => run_schedule(&config, schedule).map(|_| ExitCode::SUCCESS),
        Command::OfficeHours(oh) => run_office_hours(&config, oh).map(|_| ExitCode::SUCCESS),
        Command::Ledger(ledger) => run_ledger(&config, ledger).map(|_| ExitCode::SUCCESS),
    }
}

fn run_batch(config: &AppConfig, args: BatchArgs) -> Result<()> {
    let (roster, submitters, default_range) = if args.teams {
        let info_path = &config.semester_info_path;
        let roster = files::load_semester_info(info_path)
            .with_context(|| format!("failed to load {}", info_path.display()))?
            .roster();
        let csv = args.csv.as_ref().unwrap_or(&config.teams_csv);
        let column = args.column.as_deref().unwrap_or(&config.team_column);
        let teams = files::read_unique_column(csv, column)
            .with_context(|| format!("failed to read teams from {}", csv.display()))?;
        (roster, teams, config.team_cycles)
    } else {
        let roster = files::load_roster(&config.roster_path)
            .with_context(|| format!("failed to load {}", config.roster_path.display()))?;
        let csv = args.csv.as_ref().unwrap_or(&config.students_csv);
        let column = args.column.as_deref().unwrap_or(&config.student_column);
        let students = files::read_csv_column(csv, column)
            .with_context(|| format!("failed to read students from {}", csv.display()))?;
        (roster, students, config.homework_cycles)
    };

    if let Err(findings) = validate_input(&roster, &submitters) {
        for finding in &findings {
            warn!(kind = ?finding.kind, "{}", finding.message);
        }
        if let Some(fatal) = findings.iter().find(|f| f.is_fatal()) {
            bail!("cannot assign: {}", fatal.message);
        }
    }

    let range = CycleRange {
        first: args.first.unwrap_or(default_range.first),
        count: args.count.unwrap_or(default_range.count),
    };
    let mut assigner =
        BatchAssigner::new().with_max_attempts(args.max_attempts.unwrap_or(config.max_attempts));
    if let Some(seed) = args.seed {
        assigner = assigner.with_seed(seed);
    }

    let reviewers = roster.identities();
    let request = BatchRequest::new(submitters, reviewers.clone()).with_conflicts(roster.conflicts());
    // Every cycle is computed before anything is written.
    let cycles = assigner
        .assign_cycles(range.iter(), &request)
        .context("batch assignment failed")?;

    let output_dir = args.output_dir.as_ref().unwrap_or(&config.output_dir);
    for cycle in &cycles {
        let path = output_dir.join(files::mapping_file_name(cycle.cycle, args.teams));
        files::write_mapping(&path, &cycle.mapping)
            .with_context(|| format!("failed to write {}", path.display()))?;
        if let Some(stats) = LoadStats::from_mapping(&cycle.mapping, &reviewers) {
            info!(
                cycle = cycle.cycle,
                path = %path.display(),
                min = stats.min,
                max = stats.max,
                "mapping written"
            );
        }
    }
    info!(cycles = cycles.len(), teams = args.teams, "batch complete");
    Ok(())
}

fn run_assign(config: &AppConfig, args: AssignArgs) -> Result<ExitCode> {
    let submission = SubmissionRef::new(&args.repo, args.pr)?;
    let ledger_path = args.ledger.unwrap_or_else(|| config.ledger_path.clone());

    let publisher: Box<dyn ReviewPublisher> = if args.dry_run {
        Box::new(DryRunPublisher)
    } else {
        Box::new(
            GitHubPublisher::from_env(config.github_api_url.as_str())
                .context("failed to set up GitHub publisher")?,
        )
    };

    let roster = files::load_roster(&config.roster_path)
        .with_context(|| format!("failed to load {}", config.roster_path.display()))?;

    let store = JsonFileStore::new(&ledger_path);
    let _lock = store
        .lock(Duration::from_secs(config.lock_timeout_secs))
        .context("failed to lock ledger")?;

    let mut ledger = LoadLedger::load(store, roster.identities())
        .with_context(|| format!("failed to load ledger {}", ledger_path.display()))?;
    if args.enroll_new {
        ledger.enroll(roster.identities());
    }

    let receipt = assign_review(&mut ledger, publisher.as_ref(), &submission)
        .with_context(|| format!("failed to assign a reviewer to {submission}"))?;

    println!("{}", receipt.reviewer);
    if let Some(stats) = LoadStats::from_ledger(ledger.counts()) {
        info!(min = stats.min, max = stats.max, spread = stats.spread, "ledger load");
    }

    if receipt.fully_published() {
        Ok(ExitCode::SUCCESS)
    } else {
        warn!(%submission, reviewer = %receipt.reviewer, "assignment recorded but not fully published");
        Ok(ExitCode::from(EXIT_PUBLISH_FAILED))
    }
}

fn run_schedule(config: &AppConfig, args: ScheduleArgs) -> Result<()> {
    let schedule_path = args.schedule.as_ref().unwrap_or(&config.schedule_path);
    let output = args.output.as_ref().unwrap_or(&config.adjusted_schedule_path);
    let class_days = if args.class_days.is_empty() {
        &config.class_days
    } else {
        &args.class_days
    };

    let calendar = ClassCalendar::from_day_names(class_days)?
        .with_breaks(args.breaks)
        .with_max_lookahead(config.max_lookahead_days);
    let sections = files::load_schedule(schedule_path)
        .with_context(|| format!("failed to load {}", schedule_path.display()))?;
    let adjusted = calendar
        .adjust(&sections, args.start)
        .context("failed to date the schedule")?;

    files::write_yaml(output, &adjusted)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(sections = adjusted.len(), output = %output.display(), "schedule adjusted");
    Ok(())
}

fn run_office_hours(config: &AppConfig, args: OfficeHoursArgs) -> Result<()> {
    let info_path = args.semester_info.as_ref().unwrap_or(&config.semester_info_path);
    let info = files::load_semester_info(info_path)
        .with_context(|| format!("failed to load {}", info_path.display()))?;
    let table = office_hours::group_by_day(info.tas.values());

    match args.output {
        Some(path) => {
            files::write_yaml(&path, &table)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(days = table.office_hours.len(), output = %path.display(), "office hours written");
        }
        None => print!("{}", serde_yaml::to_string(&table)?),
    }
    Ok(())
}

fn run_ledger(config: &AppConfig, args: LedgerArgs) -> Result<()> {
    let path = args.ledger.unwrap_or_else(|| config.ledger_path.clone());
    let ledger = LoadLedger::load(JsonFileStore::new(&path), Vec::<String>::new())
        .with_context(|| format!("failed to load ledger {}", path.display()))?;

    for (reviewer, count) in ledger.counts() {
        println!("{reviewer:<24} {count}");
    }
    match LoadStats::from_ledger(ledger.counts()) {
        Some(stats) => println!(
            "\n{} reviewers, {} requests, min {}, max {}, mean {:.2}, next: {}",
            stats.reviewers,
            stats.total,
            stats.min,
            stats.max,
            stats.mean,
            stats.least_loaded.first().map(String::as_str).unwrap_or("-"),
        ),
        None => println!("ledger {} is empty", path.display()),
    }
    Ok(())
}
