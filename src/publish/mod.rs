//! Review publishing.
//!
//! After a reviewer has been chosen and the ledger persisted, the choice is
//! published to the code-review platform: the reviewer is requested on the
//! submission, and a comment tells the student who their reviewer is. Both
//! calls are best-effort.

mod github;

pub use github::{GitHubPublisher, DEFAULT_API_URL};

use std::fmt;

use tracing::info;

use crate::error::PublishError;

/// A submission on the review platform: `owner/repo` plus PR number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRef {
    pub repo: String,
    pub number: u64,
}

impl SubmissionRef {
    /// Creates a reference, checking the `owner/repo` shape.
    pub fn new(repo: impl Into<String>, number: u64) -> Result<Self, PublishError> {
        let repo = repo.into();
        match repo.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self { repo, number })
            }
            _ => Err(PublishError::Other(format!(
                "repository must look like owner/name, got '{repo}'"
            ))),
        }
    }
}

impl fmt::Display for SubmissionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}

/// Platform operations used after a reviewer is chosen.
pub trait ReviewPublisher {
    /// Requests `reviewer` on the submission.
    fn attach_reviewer(&self, submission: &SubmissionRef, reviewer: &str)
        -> Result<(), PublishError>;

    /// Posts `message` on the submission.
    fn notify(
        &self,
        submission: &SubmissionRef,
        reviewer: &str,
        message: &str,
    ) -> Result<(), PublishError>;
}

/// Comment posted once a reviewer is chosen.
pub fn notification_message(reviewer: &str) -> String {
    format!("Your TA for this assignment is @{reviewer}. They will review your submission soon!")
}

/// Publisher that only logs. Used for `--dry-run`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunPublisher;

impl ReviewPublisher for DryRunPublisher {
    fn attach_reviewer(
        &self,
        submission: &SubmissionRef,
        reviewer: &str,
    ) -> Result<(), PublishError> {
        info!(%submission, reviewer, "dry run: would request reviewer");
        Ok(())
    }

    fn notify(
        &self,
        submission: &SubmissionRef,
        reviewer: &str,
        message: &str,
    ) -> Result<(), PublishError> {
        info!(%submission, reviewer, message, "dry run: would post comment");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_ref_shape() {
        let s = SubmissionRef::new("cse-ai/student-repo", 12).unwrap();
        assert_eq!(s.to_string(), "cse-ai/student-repo#12");
        assert!(SubmissionRef::new("no-slash", 1).is_err());
        assert!(SubmissionRef::new("/repo", 1).is_err());
        assert!(SubmissionRef::new("a/b/c", 1).is_err());
    }

    #[test]
    fn test_notification_message() {
        assert_eq!(
            notification_message("alice"),
            "Your TA for this assignment is @alice. They will review your submission soon!"
        );
    }

    #[test]
    fn test_dry_run_always_succeeds() {
        let s = SubmissionRef::new("org/repo", 3).unwrap();
        assert!(DryRunPublisher.attach_reviewer(&s, "r1").is_ok());
        assert!(DryRunPublisher.notify(&s, "r1", "hi").is_ok());
    }
}
