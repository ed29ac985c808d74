//! One incremental review-request cycle.
//!
//! Order matters: the reviewer is selected and the ledger persisted before
//! anything is published. A selection is a commitment; publishing failures
//! are reported but never undo the ledger increment, and nothing is retried
//! (a retry could post a duplicate comment).

use tracing::{error, info};

use crate::error::{AssignError, PublishError};
use crate::ledger::{LedgerStore, LoadLedger};
use crate::publish::{notification_message, ReviewPublisher, SubmissionRef};
use crate::scheduler::IncrementalAssigner;

/// Outcome of a review-request cycle.
#[derive(Debug)]
pub struct ReviewReceipt {
    pub submission: SubmissionRef,
    /// Chosen reviewer.
    pub reviewer: String,
    /// Reviewer's count after this assignment.
    pub load: u64,
    /// Result of requesting the reviewer on the submission.
    pub attach: Result<(), PublishError>,
    /// Result of posting the notification comment.
    pub notify: Result<(), PublishError>,
}

impl ReviewReceipt {
    /// Whether both platform calls succeeded.
    pub fn fully_published(&self) -> bool {
        self.attach.is_ok() && self.notify.is_ok()
    }
}

/// Selects a reviewer, persists the ledger, then publishes.
///
/// Returns `Err` only for selection or storage failures; publishing
/// failures are carried in the receipt.
pub fn assign_review<S, P>(
    ledger: &mut LoadLedger<S>,
    publisher: &P,
    submission: &SubmissionRef,
) -> Result<ReviewReceipt, AssignError>
where
    S: LedgerStore,
    P: ReviewPublisher + ?Sized,
{
    let reviewer = IncrementalAssigner::new().assign_one(ledger)?;
    ledger.persist()?;
    let load = ledger.get(&reviewer);
    info!(%submission, reviewer = %reviewer, load, "ledger committed");

    let attach = publisher.attach_reviewer(submission, &reviewer);
    if let Err(e) = &attach {
        error!(%submission, reviewer = %reviewer, error = %e, "failed to request reviewer");
    }

    let message = notification_message(&reviewer);
    let notify = publisher.notify(submission, &reviewer, &message);
    if let Err(e) = &notify {
        error!(%submission, error = %e, "failed to post notification");
    }

    Ok(ReviewReceipt {
        submission: submission.clone(),
        reviewer,
        load,
        attach,
        notify,
    })
}
