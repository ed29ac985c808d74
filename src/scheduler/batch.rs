//! Randomized conflict-avoiding batch assigner.
//!
//! # Algorithm
//!
//! 1. Repeat the reviewer roster `ceil(n / m)` times so the pool covers all
//!    `n` submitters (`m` = reviewers).
//! 2. Shuffle submitters and the pool independently and zip them.
//! 3. Reject the whole candidate if any pair is a declared conflict, and
//!    retry with a fresh shuffle.
//! 4. Return the first conflict-free candidate, sorted by submitter.
//!
//! Reject-and-retry is cheap for course-sized rosters (tens of submitters)
//! but cannot detect every infeasible conflict set, so attempts are capped
//! at [`DEFAULT_MAX_ATTEMPTS`] unless configured otherwise.
//!
//! # Complexity
//! O(a * n) where a = attempts, n = submitters.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::error::AssignError;
use crate::models::{Assignment, ConflictTable, Mapping};
use crate::validation::clean_identities;

/// Retry cap for one cycle.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Input container for a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchRequest {
    /// Students or teams to pair.
    pub submitters: Vec<String>,
    /// Reviewer roster, in declaration order.
    pub reviewers: Vec<String>,
    /// Declared conflicts.
    pub conflicts: ConflictTable,
}

impl BatchRequest {
    /// Creates a request without conflicts.
    pub fn new(submitters: Vec<String>, reviewers: Vec<String>) -> Self {
        Self {
            submitters,
            reviewers,
            conflicts: ConflictTable::new(),
        }
    }

    /// Sets the conflict table.
    pub fn with_conflicts(mut self, conflicts: ConflictTable) -> Self {
        self.conflicts = conflicts;
        self
    }
}

/// Mapping produced for one numbered cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleMapping {
    /// Cycle number (homework or project index).
    pub cycle: u32,
    pub mapping: Mapping,
}

/// Randomized batch assigner.
///
/// # Example
///
/// ```
/// use ta_assign::models::ConflictTable;
/// use ta_assign::scheduler::BatchAssigner;
///
/// let submitters = vec!["s1".to_string(), "s2".to_string(), "s3".to_string()];
/// let reviewers = vec!["r1".to_string(), "r2".to_string()];
/// let conflicts = ConflictTable::new().with_conflict("r1", "s3");
///
/// let mapping = BatchAssigner::new()
///     .with_seed(7)
///     .assign(&submitters, &reviewers, &conflicts)
///     .unwrap();
/// assert_eq!(mapping.assignment_count(), 3);
/// assert_eq!(mapping.reviewer_for("s3"), Some("r2"));
/// ```
#[derive(Debug, Clone)]
pub struct BatchAssigner {
    max_attempts: usize,
    seed: Option<u64>,
}

impl BatchAssigner {
    /// Creates an assigner seeded from the thread RNG.
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
        }
    }

    /// Sets the retry cap.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Uses a fixed seed so runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Pairs every submitter with a non-conflicting reviewer.
    pub fn assign(
        &self,
        submitters: &[String],
        reviewers: &[String],
        conflicts: &ConflictTable,
    ) -> Result<Mapping, AssignError> {
        match self.seed {
            Some(seed) => {
                self.assign_with_rng(submitters, reviewers, conflicts, &mut StdRng::seed_from_u64(seed))
            }
            None => self.assign_with_rng(submitters, reviewers, conflicts, &mut rand::rng()),
        }
    }

    /// Assigns from a request.
    pub fn assign_request(&self, request: &BatchRequest) -> Result<Mapping, AssignError> {
        self.assign(&request.submitters, &request.reviewers, &request.conflicts)
    }

    /// Produces one independent mapping per cycle.
    ///
    /// All cycles are computed before returning, so a failure in any cycle
    /// yields no mappings at all.
    pub fn assign_cycles(
        &self,
        cycles: impl IntoIterator<Item = u32>,
        request: &BatchRequest,
    ) -> Result<Vec<CycleMapping>, AssignError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        cycles
            .into_iter()
            .map(|cycle| {
                let mapping = self.assign_with_rng(
                    &request.submitters,
                    &request.reviewers,
                    &request.conflicts,
                    &mut rng,
                )?;
                info!(cycle, assignments = mapping.assignment_count(), "cycle assigned");
                Ok(CycleMapping { cycle, mapping })
            })
            .collect()
    }

    /// Core loop with a caller-supplied RNG.
    pub fn assign_with_rng<R: Rng + ?Sized>(
        &self,
        submitters: &[String],
        reviewers: &[String],
        conflicts: &ConflictTable,
        rng: &mut R,
    ) -> Result<Mapping, AssignError> {
        let mut order = clean_identities("submitter", submitters);
        let reviewers = clean_identities("reviewer", reviewers);
        if order.is_empty() {
            return Err(AssignError::NoSubmitters);
        }
        if reviewers.is_empty() {
            return Err(AssignError::NoReviewers);
        }

        precheck(&order, &reviewers, conflicts)?;

        let mut pool = expand_pool(&reviewers, order.len());

        for attempt in 1..=self.max_attempts {
            order.shuffle(rng);
            pool.shuffle(rng);

            let clash = order
                .iter()
                .zip(&pool)
                .any(|(s, r)| conflicts.is_conflict(r, s));
            if clash {
                trace!(attempt, "candidate rejected");
                continue;
            }

            debug!(attempt, submitters = order.len(), "conflict-free mapping found");
            let assignments = order
                .iter()
                .zip(&pool)
                .map(|(s, r)| Assignment::new(s.as_str(), r.as_str()))
                .collect();
            return Ok(Mapping::new(assignments));
        }

        Err(AssignError::InfeasibleConflictSet {
            attempts: self.max_attempts,
            reason: None,
        })
    }
}

impl Default for BatchAssigner {
    fn default() -> Self {
        Self::new()
    }
}

/// Repeats the roster until it covers `needed` slots.
pub fn expand_pool(reviewers: &[String], needed: usize) -> Vec<String> {
    if reviewers.is_empty() {
        return Vec::new();
    }
    let copies = needed.div_ceil(reviewers.len()).max(1);
    let mut pool = Vec::with_capacity(copies * reviewers.len());
    for _ in 0..copies {
        pool.extend(reviewers.iter().cloned());
    }
    pool
}

/// Fails fast when some submitter conflicts with every reviewer.
fn precheck(
    submitters: &[String],
    reviewers: &[String],
    conflicts: &ConflictTable,
) -> Result<(), AssignError> {
    for s in submitters {
        if reviewers.iter().all(|r| conflicts.is_conflict(r, s)) {
            return Err(AssignError::InfeasibleConflictSet {
                attempts: 0,
                reason: Some(format!("submitter '{s}' conflicts with every reviewer")),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use std::collections::HashSet;

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{prefix}{i}")).collect()
    }

    #[test]
    fn test_expand_pool() {
        let reviewers = ids("r", 3);
        assert_eq!(expand_pool(&reviewers, 6).len(), 6);
        assert_eq!(expand_pool(&reviewers, 7).len(), 9);
        assert_eq!(expand_pool(&reviewers, 1).len(), 3);
        assert!(expand_pool(&[], 5).is_empty());
    }

    #[test]
    fn test_covers_every_submitter_once() {
        let submitters = ids("s", 6);
        let reviewers = ids("r", 3);
        let mut rng = SmallRng::seed_from_u64(42);
        let mapping = BatchAssigner::new()
            .assign_with_rng(&submitters, &reviewers, &ConflictTable::new(), &mut rng)
            .unwrap();

        assert_eq!(mapping.assignment_count(), 6);
        let seen: HashSet<&str> = mapping.assignments().iter().map(|a| a.submitter.as_str()).collect();
        assert_eq!(seen.len(), 6);
        // Exact multiple: every reviewer gets the same share.
        assert!(mapping.reviewer_loads().values().all(|&n| n == 2));
    }

    #[test]
    fn test_output_sorted_by_submitter() {
        let submitters = vec!["zoe".to_string(), "adam".to_string(), "mia".to_string()];
        let reviewers = ids("r", 2);
        let mapping = BatchAssigner::new()
            .with_seed(1)
            .assign(&submitters, &reviewers, &ConflictTable::new())
            .unwrap();
        let order: Vec<&str> = mapping.assignments().iter().map(|a| a.submitter.as_str()).collect();
        assert_eq!(order, vec!["adam", "mia", "zoe"]);
    }

    #[test]
    fn test_conflict_forces_other_reviewer() {
        let submitters = ids("s", 3);
        let reviewers = ids("r", 2);
        let conflicts = ConflictTable::new().with_conflict("r1", "s3");

        for seed in 0..50 {
            let mapping = BatchAssigner::new()
                .with_seed(seed)
                .assign(&submitters, &reviewers, &conflicts)
                .unwrap();
            assert_eq!(mapping.reviewer_for("s3"), Some("r2"));
            assert!(mapping.is_conflict_free(&conflicts));
        }
    }

    #[test]
    fn test_same_seed_same_mapping() {
        let submitters = ids("s", 10);
        let reviewers = ids("r", 3);
        let conflicts = ConflictTable::new().with_conflict("r2", "s4");
        let a = BatchAssigner::new().with_seed(99).assign(&submitters, &reviewers, &conflicts).unwrap();
        let b = BatchAssigner::new().with_seed(99).assign(&submitters, &reviewers, &conflicts).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_precheck_detects_total_conflict() {
        let err = BatchAssigner::new()
            .assign(&ids("s", 1), &ids("r", 1), &ConflictTable::new().with_conflict("r1", "s1"))
            .unwrap_err();
        match err {
            AssignError::InfeasibleConflictSet { attempts, reason } => {
                assert_eq!(attempts, 0);
                assert!(reason.unwrap().contains("s1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_retry_cap_on_capacity_infeasible() {
        // r1 must take two of four submitters but conflicts with three of them.
        let conflicts = ConflictTable::new()
            .with_conflict("r1", "s1")
            .with_conflict("r1", "s2")
            .with_conflict("r1", "s3");
        let err = BatchAssigner::new()
            .with_seed(3)
            .with_max_attempts(50)
            .assign(&ids("s", 4), &ids("r", 2), &conflicts)
            .unwrap_err();
        assert!(matches!(
            err,
            AssignError::InfeasibleConflictSet { attempts: 50, reason: None }
        ));
    }

    #[test]
    fn test_empty_inputs() {
        let assigner = BatchAssigner::new();
        assert!(matches!(
            assigner.assign(&[], &ids("r", 1), &ConflictTable::new()),
            Err(AssignError::NoSubmitters)
        ));
        assert!(matches!(
            assigner.assign(&ids("s", 1), &["  ".to_string()], &ConflictTable::new()),
            Err(AssignError::NoReviewers)
        ));
    }

    #[test]
    fn test_malformed_identities_skipped() {
        let submitters = vec!["s1".to_string(), String::new(), "s1".to_string(), "s2".to_string()];
        let mapping = BatchAssigner::new()
            .with_seed(5)
            .assign(&submitters, &ids("r", 1), &ConflictTable::new())
            .unwrap();
        assert_eq!(mapping.assignment_count(), 2);
        assert!(mapping.assignments().iter().all(|a| !a.submitter.is_empty()));
    }

    #[test]
    fn test_assign_cycles() {
        let request = BatchRequest::new(ids("s", 5), ids("r", 2))
            .with_conflicts(ConflictTable::new().with_conflict("r2", "s5"));
        let cycles = BatchAssigner::new()
            .with_seed(11)
            .assign_cycles(1..=5, &request)
            .unwrap();
        assert_eq!(cycles.iter().map(|c| c.cycle).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        for c in &cycles {
            assert_eq!(c.mapping.assignment_count(), 5);
            assert_eq!(c.mapping.reviewer_for("s5"), Some("r1"));
        }
    }

    #[test]
    fn test_assign_cycles_all_or_nothing() {
        let request = BatchRequest::new(ids("s", 1), ids("r", 1))
            .with_conflicts(ConflictTable::new().with_conflict("r1", "s1"));
        assert!(BatchAssigner::new().assign_cycles(0..3, &request).is_err());
    }
}
