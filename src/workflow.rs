//! Approval workflow shared by overtime entries and vacation requests.
//!
//! A record starts [`ApprovalStatus::Pending`] and moves exactly once to
//! [`ApprovalStatus::Approved`] or [`ApprovalStatus::Rejected`]. Both are
//! terminal. Side effects of a decision (ledger credit, balance mutation) are
//! the caller's concern and must be committed in the same write as the new
//! [`Approval`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Status of a record subject to approval.
///
/// # Example
///
/// ```
/// use time_ledger::workflow::ApprovalStatus;
///
/// assert_eq!(
///     ApprovalStatus::Pending.transition(ApprovalStatus::Approved),
///     Some(ApprovalStatus::Approved)
/// );
/// assert_eq!(ApprovalStatus::Approved.transition(ApprovalStatus::Rejected), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalStatus {
    /// Awaiting a decision.
    #[serde(rename = "PENDIENTE")]
    Pending,
    /// Approved (terminal).
    #[serde(rename = "APROBADO")]
    Approved,
    /// Rejected (terminal).
    #[serde(rename = "RECHAZADO")]
    Rejected,
}

impl ApprovalStatus {
    /// Returns the status reached by moving to `target`, or `None` when the
    /// move is not allowed.
    pub fn transition(self, target: ApprovalStatus) -> Option<ApprovalStatus> {
        match (self, target) {
            (ApprovalStatus::Pending, ApprovalStatus::Approved) => Some(ApprovalStatus::Approved),
            (ApprovalStatus::Pending, ApprovalStatus::Rejected) => Some(ApprovalStatus::Rejected),
            (ApprovalStatus::Pending, ApprovalStatus::Pending)
            | (ApprovalStatus::Approved, _)
            | (ApprovalStatus::Rejected, _) => None,
        }
    }

    /// Returns true for approved and rejected records.
    pub fn is_terminal(self) -> bool {
        match self {
            ApprovalStatus::Pending => false,
            ApprovalStatus::Approved | ApprovalStatus::Rejected => true,
        }
    }

    /// The wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "PENDIENTE",
            ApprovalStatus::Approved => "APROBADO",
            ApprovalStatus::Rejected => "RECHAZADO",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision taken by an approver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Approve the record.
    Approve {
        /// The authenticated approver.
        approver_id: String,
    },
    /// Reject the record with a mandatory comment.
    Reject {
        /// The authenticated approver.
        approver_id: String,
        /// Why the record was rejected.
        comment: String,
    },
}

impl Decision {
    /// The status this decision leads to.
    pub fn target(&self) -> ApprovalStatus {
        match self {
            Decision::Approve { .. } => ApprovalStatus::Approved,
            Decision::Reject { .. } => ApprovalStatus::Rejected,
        }
    }

    fn approver_id(&self) -> &str {
        match self {
            Decision::Approve { approver_id } | Decision::Reject { approver_id, .. } => approver_id,
        }
    }
}

/// Approval state embedded in overtime entries and vacation requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    /// Current status.
    pub status: ApprovalStatus,
    /// Who decided, once decided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver_id: Option<String>,
    /// When the decision was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
    /// Rejection comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Approval {
    /// A fresh, undecided approval.
    pub fn pending() -> Self {
        Self {
            status: ApprovalStatus::Pending,
            approver_id: None,
            decided_at: None,
            comment: None,
        }
    }

    /// Applies `decision` and returns the decided approval.
    ///
    /// `entity` and `id` only label the error. Fails with
    /// `InvalidStateTransition` unless the current status is pending, and
    /// with `ValidationError` for an empty approver or rejection comment.
    pub fn decide(
        &self,
        entity: &str,
        id: &str,
        decision: &Decision,
        at: DateTime<Utc>,
    ) -> EngineResult<Approval> {
        let target = decision.target();
        let status =
            self.status
                .transition(target)
                .ok_or_else(|| EngineError::InvalidStateTransition {
                    entity: entity.to_string(),
                    id: id.to_string(),
                    from: self.status.to_string(),
                    to: target.to_string(),
                })?;

        let approver_id = decision.approver_id().trim();
        if approver_id.is_empty() {
            return Err(EngineError::validation("approver_id", "must not be empty"));
        }

        let comment = match decision {
            Decision::Approve { .. } => None,
            Decision::Reject { comment, .. } => {
                let comment = comment.trim();
                if comment.is_empty() {
                    return Err(EngineError::validation(
                        "comment",
                        "a rejection requires a comment",
                    ));
                }
                Some(comment.to_string())
            }
        };

        Ok(Approval {
            status,
            approver_id: Some(approver_id.to_string()),
            decided_at: Some(at),
            comment,
        })
    }
}

impl Default for Approval {
    fn default() -> Self {
        Self::pending()
    }
}
