//! Least-loaded incremental assigner.
//!
//! Picks one reviewer for one new review request: the reviewer with the
//! smallest ledger count, ties going to the earliest ledger entry. The
//! tie-break is positional rather than random so that repeated selection
//! against an unchanged ledger is deterministic.

use indexmap::IndexMap;
use tracing::info;

use crate::error::AssignError;
use crate::ledger::{LedgerStore, LoadLedger};

/// Least-loaded reviewer selection.
///
/// # Example
///
/// ```
/// use ta_assign::ledger::{LoadLedger, MemoryStore};
/// use ta_assign::scheduler::IncrementalAssigner;
///
/// let store = MemoryStore::with_counts(
///     [("r1", 3), ("r2", 1), ("r3", 1)]
///         .into_iter()
///         .map(|(r, c)| (r.to_string(), c))
///         .collect(),
/// );
/// let mut ledger = LoadLedger::load(store, Vec::<String>::new()).unwrap();
///
/// let chosen = IncrementalAssigner::new().assign_one(&mut ledger).unwrap();
/// assert_eq!(chosen, "r2");
/// assert_eq!(ledger.get("r2"), 2);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IncrementalAssigner;

impl IncrementalAssigner {
    pub fn new() -> Self {
        Self
    }

    /// The reviewer that would be chosen next, without mutating anything.
    pub fn select(counts: &IndexMap<String, u64>) -> Option<&str> {
        // min_by_key keeps the first of equal minima.
        counts
            .iter()
            .min_by_key(|&(_, &count)| count)
            .map(|(reviewer, _)| reviewer.as_str())
    }

    /// Chooses the least-loaded reviewer and increments their count.
    ///
    /// The ledger is mutated in memory only; the caller persists it.
    pub fn assign_one<S: LedgerStore>(
        &self,
        ledger: &mut LoadLedger<S>,
    ) -> Result<String, AssignError> {
        let reviewer = Self::select(ledger.counts())
            .ok_or(AssignError::EmptyLedger)?
            .to_string();
        let load = ledger.increment(&reviewer);
        info!(reviewer = %reviewer, load, "reviewer selected");
        Ok(reviewer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LedgerCounts, MemoryStore};

    fn ledger(pairs: &[(&str, u64)]) -> LoadLedger<MemoryStore> {
        let counts: LedgerCounts = pairs.iter().map(|&(r, c)| (r.to_string(), c)).collect();
        LoadLedger::load(MemoryStore::with_counts(counts), Vec::<String>::new()).unwrap()
    }

    #[test]
    fn test_first_minimum_wins() {
        let mut l = ledger(&[("r1", 3), ("r2", 1), ("r3", 1)]);
        let chosen = IncrementalAssigner::new().assign_one(&mut l).unwrap();
        assert_eq!(chosen, "r2");
        assert_eq!(l.get("r1"), 3);
        assert_eq!(l.get("r2"), 2);
        assert_eq!(l.get("r3"), 1);
    }

    #[test]
    fn test_select_is_stable_without_increments() {
        let l = ledger(&[("r3", 0), ("r1", 0), ("r2", 0)]);
        for _ in 0..5 {
            assert_eq!(IncrementalAssigner::select(l.counts()), Some("r3"));
        }
    }

    #[test]
    fn test_round_robin_from_zero() {
        let mut l = ledger(&[("a", 0), ("b", 0), ("c", 0)]);
        let assigner = IncrementalAssigner::new();
        let picks: Vec<String> = (0..6).map(|_| assigner.assign_one(&mut l).unwrap()).collect();
        assert_eq!(picks, vec!["a", "b", "c", "a", "b", "c"]);
    }

    #[test]
    fn test_increments_exactly_once() {
        let mut l = ledger(&[("r1", 5), ("r2", 2)]);
        let before: u64 = l.counts().values().sum();
        IncrementalAssigner::new().assign_one(&mut l).unwrap();
        let after: u64 = l.counts().values().sum();
        assert_eq!(after, before + 1);
    }

    #[test]
    fn test_does_not_persist() {
        let store = MemoryStore::with_counts([("r1".to_string(), 0)].into_iter().collect());
        let mut l = LoadLedger::load(store.clone(), Vec::<String>::new()).unwrap();
        IncrementalAssigner::new().assign_one(&mut l).unwrap();
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.snapshot().unwrap()["r1"], 0);
    }

    #[test]
    fn test_empty_ledger() {
        let mut l = ledger(&[]);
        assert!(matches!(
            IncrementalAssigner::new().assign_one(&mut l),
            Err(AssignError::EmptyLedger)
        ));
    }
}
