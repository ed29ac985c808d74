//! Reviewer (teaching assistant) records.
//!
//! Reviewers are the staff who review submissions. Each record carries
//! an identity (the code-review handle), an optional display name,
//! declared conflicts and optional office-hour details.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::ConflictTable;

/// A reviewer as declared in the staff roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerRecord {
    /// Reviewer identity. Empty identities are malformed and skipped.
    #[serde(default)]
    pub github: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Submitters (students or teams) this reviewer must not review.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub conflicts: Vec<String>,
    /// Office-hour day label.
    #[serde(rename = "OH Days", default, skip_serializing_if = "Option::is_none")]
    pub oh_days: Option<String>,
    /// Office-hour time label.
    #[serde(rename = "OH Times", default, skip_serializing_if = "Option::is_none")]
    pub oh_times: Option<String>,
    /// Office-hour location.
    #[serde(rename = "OH Location", default, skip_serializing_if = "Option::is_none")]
    pub oh_location: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ReviewerRecord {
    /// Creates a record with the given identity.
    pub fn new(github: impl Into<String>) -> Self {
        Self {
            github: github.into(),
            ..Default::default()
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds conflicting submitters.
    pub fn with_conflicts<I, S>(mut self, conflicts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conflicts.extend(conflicts.into_iter().map(Into::into));
        self
    }

    /// Sets office-hour details.
    pub fn with_office_hours(
        mut self,
        days: impl Into<String>,
        times: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        self.oh_days = Some(days.into());
        self.oh_times = Some(times.into());
        self.oh_location = Some(location.into());
        self
    }

    /// Name shown to students, falling back to the identity.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.github)
    }
}

/// The staff roster, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    pub records: Vec<ReviewerRecord>,
}

impl Roster {
    pub fn new(records: Vec<ReviewerRecord>) -> Self {
        Self { records }
    }

    /// Raw identities in declaration order (not cleaned).
    pub fn identities(&self) -> Vec<String> {
        self.records.iter().map(|r| r.github.clone()).collect()
    }

    /// Conflict table declared by this roster.
    pub fn conflicts(&self) -> ConflictTable {
        ConflictTable::from_records(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Semester information document holding the staff under a `TAs` key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemesterInfo {
    #[serde(rename = "Term", default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(rename = "Year", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<serde_yaml::Value>,
    /// Staff keyed by an arbitrary local id, in document order.
    #[serde(rename = "TAs", default)]
    pub tas: IndexMap<String, ReviewerRecord>,
}

impl SemesterInfo {
    /// Staff roster in document order.
    pub fn roster(&self) -> Roster {
        Roster::new(self.tas.values().cloned().collect())
    }
}
