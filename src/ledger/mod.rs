//! Persisted reviewer workload ledger.
//!
//! The ledger is the only state that survives between runs: reviewer
//! identity → number of review requests assigned so far. It is read at the
//! start of each incremental run, mutated in memory, and written back whole
//! before anything is published.
//!
//! Insertion order is significant: it is the tie-break order used by
//! [`IncrementalAssigner`](crate::scheduler::IncrementalAssigner).

mod store;

pub use store::{JsonFileStore, LedgerLock, LedgerStore, MemoryStore};

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::validation::clean_identities;

/// Reviewer → assignment count, in insertion order.
pub type LedgerCounts = IndexMap<String, u64>;

/// Running workload tally bound to its storage backend.
#[derive(Debug)]
pub struct LoadLedger<S> {
    store: S,
    counts: LedgerCounts,
}

impl<S: LedgerStore> LoadLedger<S> {
    /// Loads the ledger, seeding it from `roster` if nothing was persisted.
    ///
    /// Persisted state is returned as-is: reviewers that left the roster are
    /// kept and new roster members are not added (see [`LoadLedger::enroll`]).
    pub fn load<I, T>(store: S, roster: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let counts = match store.read()? {
            Some(counts) => {
                debug!(reviewers = counts.len(), "ledger loaded");
                counts
            }
            None => {
                let counts: LedgerCounts = clean_identities("reviewer", roster)
                    .into_iter()
                    .map(|r| (r, 0))
                    .collect();
                info!(reviewers = counts.len(), "no persisted ledger, starting from zero");
                counts
            }
        };
        Ok(Self { store, counts })
    }

    /// Adds one assignment to `reviewer`, returning the new count.
    pub fn increment(&mut self, reviewer: &str) -> u64 {
        let count = self.counts.entry(reviewer.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Writes the full ledger back, replacing what was stored.
    pub fn persist(&self) -> Result<(), StorageError> {
        self.store.write(&self.counts)?;
        debug!(reviewers = self.counts.len(), "ledger persisted");
        Ok(())
    }

    /// Appends roster members missing from the ledger at zero.
    ///
    /// Never removes anyone. Returns the identities that were added.
    pub fn enroll<I, T>(&mut self, roster: I) -> Vec<String>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut added = Vec::new();
        for reviewer in clean_identities("reviewer", roster) {
            if !self.counts.contains_key(&reviewer) {
                self.counts.insert(reviewer.clone(), 0);
                added.push(reviewer);
            }
        }
        if !added.is_empty() {
            info!(added = ?added, "enrolled new reviewers");
        }
        added
    }
}

impl<S> LoadLedger<S> {
    /// Current count for a reviewer (zero if absent).
    pub fn get(&self, reviewer: &str) -> u64 {
        self.counts.get(reviewer).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &LedgerCounts {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
