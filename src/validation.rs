//! Input validation for assignment runs.
//!
//! Checks structural integrity of the staff roster and the submitter list
//! before assigning. Detects:
//! - Empty identities
//! - Duplicate identities
//! - Conflicts naming submitters that are not in this run
//! - Empty rosters
//!
//! Nothing here is fatal on its own: malformed records are skipped by
//! [`clean_identities`] and stale conflicts never match. The report exists
//! so operators see what was dropped.

use std::collections::HashSet;

use tracing::warn;

use crate::models::Roster;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation finding.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Finding category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two records share the same identity.
    DuplicateId,
    /// A record has a blank identity.
    EmptyIdentity,
    /// A conflict names a submitter not present in this run.
    UnknownConflictTarget,
    /// No usable reviewers.
    EmptyRoster,
    /// No usable submitters.
    NoSubmitters,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether the run cannot proceed because of this finding.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            ValidationErrorKind::EmptyRoster | ValidationErrorKind::NoSubmitters
        )
    }
}

/// Validates a roster against the submitters of one run.
///
/// Checks:
/// 1. No empty reviewer or submitter identities
/// 2. No duplicate reviewer or submitter identities
/// 3. Every conflict names a known submitter
/// 4. At least one usable reviewer and submitter
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(findings)` with everything detected.
pub fn validate_input(roster: &Roster, submitters: &[String]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut reviewer_ids = HashSet::new();
    for record in &roster.records {
        let id = record.github.trim();
        if id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyIdentity,
                format!(
                    "Reviewer record '{}' has no identity",
                    record.name.as_deref().unwrap_or("<unnamed>")
                ),
            ));
        } else if !reviewer_ids.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate reviewer identity: {id}"),
            ));
        }
    }

    let mut submitter_ids = HashSet::new();
    for s in submitters {
        let id = s.trim();
        if id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyIdentity,
                "Submitter list contains an empty identity",
            ));
        } else if !submitter_ids.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate submitter identity: {id}"),
            ));
        }
    }

    for record in &roster.records {
        for target in &record.conflicts {
            let target = target.trim();
            if !target.is_empty() && !submitter_ids.contains(target) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownConflictTarget,
                    format!(
                        "Reviewer '{}' declares a conflict with unknown submitter '{}'",
                        record.github, target
                    ),
                ));
            }
        }
    }

    if reviewer_ids.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyRoster,
            "Roster has no usable reviewers",
        ));
    }
    if submitter_ids.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoSubmitters,
            "No usable submitters",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Trims identities and drops blank and repeated ones, keeping first
/// occurrences in order. Every dropped entry is logged.
pub fn clean_identities<I, S>(kind: &str, ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut cleaned = Vec::new();
    for (index, id) in ids.into_iter().enumerate() {
        let id = id.as_ref().trim();
        if id.is_empty() {
            warn!(kind, index, "skipping record with empty identity");
            continue;
        }
        if !seen.insert(id.to_string()) {
            warn!(kind, identity = id, "skipping duplicate identity");
            continue;
        }
        cleaned.push(id.to_string());
    }
    cleaned
}
