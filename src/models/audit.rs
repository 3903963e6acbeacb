//! Audit trail models.
//!
//! Classification decisions are recorded step by step so an approver can see
//! why a run of overtime received its type and multiplier.

use serde::{Deserialize, Serialize};

/// A single step in the audit trace recording a classification decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
///
/// # Example
///
/// ```
/// use time_ledger::models::AuditStep;
/// use serde_json::json;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "sunday_overtime".to_string(),
///     rule_name: "Sunday Overtime".to_string(),
///     input: json!({"date": "2025-01-05"}),
///     output: json!({"multiplier": "2.0"}),
///     reasoning: "2025-01-05 is a Sunday".to_string(),
/// };
/// assert_eq!(step.rule_id, "sunday_overtime");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}
