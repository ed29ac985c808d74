//! End-to-end assignment scenarios through the public API.

use std::fs;

use chrono::NaiveDate;
use ta_assign::error::{AssignError, PublishError};
use ta_assign::files;
use ta_assign::ledger::{JsonFileStore, LedgerCounts, LoadLedger, MemoryStore};
use ta_assign::models::{ClassCalendar, ConflictTable, ScheduleSection};
use ta_assign::publish::{ReviewPublisher, SubmissionRef};
use ta_assign::review::assign_review;
use ta_assign::scheduler::{BatchAssigner, BatchRequest, IncrementalAssigner, LoadStats};

fn ids(prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{prefix}{i}")).collect()
}

fn counts(pairs: &[(&str, u64)]) -> LedgerCounts {
    pairs.iter().map(|&(r, c)| (r.to_string(), c)).collect()
}

struct FailingPublisher;

impl ReviewPublisher for FailingPublisher {
    fn attach_reviewer(&self, _: &SubmissionRef, _: &str) -> Result<(), PublishError> {
        Err(PublishError::Status {
            status: 502,
            body: "bad gateway".into(),
        })
    }

    fn notify(&self, _: &SubmissionRef, _: &str, _: &str) -> Result<(), PublishError> {
        Err(PublishError::Status {
            status: 502,
            body: "bad gateway".into(),
        })
    }
}

#[test]
fn batch_without_conflicts_covers_everyone_evenly() {
    let submitters = ids("s", 6);
    let reviewers = ids("r", 3);

    for seed in 0..20 {
        let mapping = BatchAssigner::new()
            .with_seed(seed)
            .assign(&submitters, &reviewers, &ConflictTable::new())
            .unwrap();

        assert_eq!(mapping.assignment_count(), 6);
        for s in &submitters {
            assert!(mapping.reviewer_for(s).is_some(), "{s} unassigned");
        }
        let stats = LoadStats::from_mapping(&mapping, &reviewers).unwrap();
        assert_eq!((stats.min, stats.max), (2, 2));
    }
}

#[test]
fn batch_routes_conflicted_submitter_away() {
    let conflicts = ConflictTable::new().with_conflict("r1", "s3");
    let request = BatchRequest::new(ids("s", 3), ids("r", 2)).with_conflicts(conflicts.clone());

    let cycles = BatchAssigner::new()
        .with_seed(7)
        .assign_cycles(0..12, &request)
        .unwrap();

    assert_eq!(cycles.len(), 12);
    for c in &cycles {
        assert_eq!(c.mapping.reviewer_for("s3"), Some("r2"), "cycle {}", c.cycle);
        assert!(c.mapping.is_conflict_free(&conflicts));
    }
}

#[test]
fn incremental_picks_first_least_loaded() {
    let store = MemoryStore::with_counts(counts(&[("r1", 3), ("r2", 1), ("r3", 1)]));
    let mut ledger = LoadLedger::load(store.clone(), Vec::<String>::new()).unwrap();

    let chosen = IncrementalAssigner::new().assign_one(&mut ledger).unwrap();

    assert_eq!(chosen, "r2");
    assert_eq!(ledger.counts(), &counts(&[("r1", 3), ("r2", 2), ("r3", 1)]));
    // assign_one does not persist on its own.
    assert_eq!(store.write_count(), 0);
}

#[test]
fn infeasible_conflicts_fail_instead_of_looping() {
    let conflicts = ConflictTable::new().with_conflict("r1", "s1");
    let err = BatchAssigner::new()
        .assign(&ids("s", 1), &ids("r", 1), &conflicts)
        .unwrap_err();
    assert!(matches!(err, AssignError::InfeasibleConflictSet { .. }));
}

#[test]
fn repeated_requests_keep_spread_at_most_one() {
    let store = MemoryStore::new();
    let mut ledger = LoadLedger::load(store, ids("r", 4)).unwrap();
    let assigner = IncrementalAssigner::new();

    for _ in 0..23 {
        assigner.assign_one(&mut ledger).unwrap();
        let stats = LoadStats::from_ledger(ledger.counts()).unwrap();
        assert!(stats.spread <= 1);
    }
    assert_eq!(LoadStats::from_ledger(ledger.counts()).unwrap().total, 23);
}

#[test]
fn file_ledger_survives_runs_and_publish_failures() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("json").join("ta_assignment.json");
    let roster = vec!["alice", "bob", "carol"];
    let submission = SubmissionRef::new("course/hw2-dave", 3).unwrap();

    let mut chosen = Vec::new();
    for _ in 0..4 {
        let store = JsonFileStore::new(&path);
        let _lock = store.lock(std::time::Duration::from_secs(1)).unwrap();
        let mut ledger = LoadLedger::load(store, &roster).unwrap();
        let receipt = assign_review(&mut ledger, &FailingPublisher, &submission).unwrap();
        assert!(!receipt.fully_published());
        chosen.push(receipt.reviewer);
    }

    assert_eq!(chosen, vec!["alice", "bob", "carol", "alice"]);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "{\n  \"alice\": 2,\n  \"bob\": 1,\n  \"carol\": 1\n}"
    );
    assert!(!tmp.path().join("json").join("ta_assignment.json.lock").exists());
}

#[test]
fn ledger_load_then_persist_is_identity() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("ledger.json");
    let original = "{\n  \"zed\": 4,\n  \"amy\": 0,\n  \"gone\": 7\n}";
    fs::write(&path, original).unwrap();

    let ledger = LoadLedger::load(JsonFileStore::new(&path), ["amy", "new"]).unwrap();
    ledger.persist().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn schedule_file_is_dated_around_breaks() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("schedule.yaml");
    let output = tmp.path().join("adjusted_schedule.yaml");
    fs::write(
        &input,
        "- week: 1\n  days:\n  - topic: Intro\n  - topic: Git\n- week: 2\n  days:\n  - topic: Rust\n  - topic: Testing\n",
    )
    .unwrap();

    let calendar = ClassCalendar::from_day_names(["Monday", "Wednesday"])
        .unwrap()
        .with_break(NaiveDate::from_ymd_opt(2025, 1, 20).unwrap());
    let sections = files::load_schedule(&input).unwrap();
    let adjusted = calendar
        .adjust(&sections, NaiveDate::from_ymd_opt(2025, 1, 13).unwrap())
        .unwrap();
    files::write_yaml(&output, &adjusted).unwrap();

    let reread: Vec<ScheduleSection> = serde_yaml::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let dates: Vec<&str> = reread
        .iter()
        .flat_map(|s| s.days.iter().flatten())
        .filter_map(|d| d.date.as_deref())
        .collect();
    assert_eq!(dates, vec!["Mon 01/13", "Wed 01/15", "Wed 01/22", "Mon 01/27"]);
}
