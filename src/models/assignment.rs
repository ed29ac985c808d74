//! Batch assignment (solution) model.
//!
//! A mapping is the complete pairing of submitters to reviewers for one
//! homework or project cycle. Entries are kept sorted by submitter so the
//! emitted file does not depend on how the pairing was found.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::ConflictTable;

/// A submitter-reviewer pair.
///
/// Serialized as a two-element sequence `[submitter, reviewer]`, the row
/// shape grading tooling reads back.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "[String; 2]", into = "[String; 2]")]
pub struct Assignment {
    /// Student or team identity.
    pub submitter: String,
    /// Reviewer identity.
    pub reviewer: String,
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(submitter: impl Into<String>, reviewer: impl Into<String>) -> Self {
        Self {
            submitter: submitter.into(),
            reviewer: reviewer.into(),
        }
    }
}

impl From<[String; 2]> for Assignment {
    fn from([submitter, reviewer]: [String; 2]) -> Self {
        Self {
            submitter,
            reviewer,
        }
    }
}

impl From<Assignment> for [String; 2] {
    fn from(a: Assignment) -> Self {
        [a.submitter, a.reviewer]
    }
}

/// A complete reviewer mapping for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping {
    assignments: Vec<Assignment>,
}

impl Mapping {
    /// Builds a mapping, sorting entries by submitter identity.
    pub fn new(mut assignments: Vec<Assignment>) -> Self {
        assignments.sort();
        Self { assignments }
    }

    /// Entries in submitter order.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Reviewer assigned to a submitter.
    pub fn reviewer_for(&self, submitter: &str) -> Option<&str> {
        self.assignments
            .binary_search_by(|a| a.submitter.as_str().cmp(submitter))
            .ok()
            .map(|i| self.assignments[i].reviewer.as_str())
    }

    /// All submitters paired with a reviewer.
    pub fn submitters_for(&self, reviewer: &str) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|a| a.reviewer == reviewer)
            .map(|a| a.submitter.as_str())
            .collect()
    }

    /// Assignments that pair a reviewer with a declared conflict.
    pub fn conflict_violations<'a>(&'a self, conflicts: &ConflictTable) -> Vec<&'a Assignment> {
        self.assignments
            .iter()
            .filter(|a| conflicts.is_conflict(&a.reviewer, &a.submitter))
            .collect()
    }

    /// Whether no assignment violates a conflict.
    pub fn is_conflict_free(&self, conflicts: &ConflictTable) -> bool {
        !self
            .assignments
            .iter()
            .any(|a| conflicts.is_conflict(&a.reviewer, &a.submitter))
    }

    /// Submitters per reviewer, in first-appearance order.
    pub fn reviewer_loads(&self) -> IndexMap<String, u64> {
        let mut loads: IndexMap<String, u64> = IndexMap::new();
        for a in &self.assignments {
            *loads.entry(a.reviewer.clone()).or_insert(0) += 1;
        }
        loads
    }

    pub fn into_assignments(self) -> Vec<Assignment> {
        self.assignments
    }
}
