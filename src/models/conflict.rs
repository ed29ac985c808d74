//! Reviewer conflict-of-interest table.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::ReviewerRecord;

/// Reviewer → submitters that reviewer must never be paired with.
///
/// Unknown reviewers and stale submitter names are tolerated: they simply
/// never match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictTable {
    entries: HashMap<String, HashSet<String>>,
}

impl ConflictTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from reviewer records.
    ///
    /// Records without an identity and blank conflict names are skipped
    /// with a diagnostic.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ReviewerRecord>) -> Self {
        let mut table = Self::new();
        for record in records {
            let reviewer = record.github.trim();
            if reviewer.is_empty() {
                if !record.conflicts.is_empty() {
                    warn!(
                        conflicts = record.conflicts.len(),
                        "skipping conflicts of reviewer record with empty identity"
                    );
                }
                continue;
            }
            for submitter in &record.conflicts {
                let submitter = submitter.trim();
                if submitter.is_empty() {
                    warn!(reviewer, "skipping empty conflict entry");
                    continue;
                }
                table.add(reviewer, submitter);
            }
        }
        table
    }

    /// Declares a conflict.
    pub fn add(&mut self, reviewer: impl Into<String>, submitter: impl Into<String>) {
        self.entries
            .entry(reviewer.into())
            .or_default()
            .insert(submitter.into());
    }

    /// Builder form of [`ConflictTable::add`].
    pub fn with_conflict(mut self, reviewer: impl Into<String>, submitter: impl Into<String>) -> Self {
        self.add(reviewer, submitter);
        self
    }

    /// Submitters a reviewer conflicts with (empty if none declared).
    pub fn conflicts_of(&self, reviewer: &str) -> &HashSet<String> {
        static EMPTY: std::sync::OnceLock<HashSet<String>> = std::sync::OnceLock::new();
        self.entries
            .get(reviewer)
            .unwrap_or_else(|| EMPTY.get_or_init(HashSet::new))
    }

    /// Whether pairing `reviewer` with `submitter` is forbidden.
    #[inline]
    pub fn is_conflict(&self, reviewer: &str, submitter: &str) -> bool {
        self.entries
            .get(reviewer)
            .is_some_and(|set| set.contains(submitter))
    }

    /// Reviewers with at least one declared conflict.
    pub fn reviewers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Total number of declared pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
