//! Error types for the Time & Pay Ledger Engine.
//!
//! Every engine operation returns [`EngineResult`]. Domain failures
//! (state transitions, balances, validation) and infrastructure failures
//! (configuration files, the backing store) share one error type so they
//! propagate with `?` from the store up to the HTTP layer.

use chrono::NaiveDateTime;
use thiserror::Error;

/// The main error type for the Time & Pay Ledger Engine.
///
/// # Example
///
/// ```
/// use time_ledger::error::EngineError;
///
/// let error = EngineError::NotFound {
///     entity: "overtime_entry".to_string(),
///     id: "ot_001".to_string(),
/// };
/// assert_eq!(error.to_string(), "overtime_entry not found: ot_001");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// No global schedule configuration has been created yet.
    #[error("Schedule configuration missing: {message}")]
    ConfigurationMissing {
        /// What was being resolved when the configuration was needed.
        message: String,
    },

    /// A time or date interval was empty or reversed.
    #[error("Invalid interval [{start}, {end}): {message}")]
    InvalidInterval {
        /// Interval start.
        start: NaiveDateTime,
        /// Interval end.
        end: NaiveDateTime,
        /// Why the interval was rejected.
        message: String,
    },

    /// An approval decision was attempted from a non-pending state.
    #[error("Invalid state transition for {entity} '{id}': {from} -> {to}")]
    InvalidStateTransition {
        /// The kind of record (e.g. "overtime_entry").
        entity: String,
        /// The record id.
        id: String,
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },

    /// A balance does not cover the requested amount.
    #[error("Insufficient balance for employee '{employee_id}': requested {requested}, available {available}")]
    InsufficientBalance {
        /// The employee whose balance was checked.
        employee_id: String,
        /// The requested amount (days or minutes).
        requested: i64,
        /// The amount available.
        available: i64,
    },

    /// An input field failed validation.
    #[error("Validation error on '{field}': {message}")]
    ValidationError {
        /// The offending field.
        field: String,
        /// A description of the problem.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record.
        entity: String,
        /// The id that was looked up.
        id: String,
    },

    /// A concurrent write changed a document between read and commit.
    ///
    /// The batch was not applied; the caller should retry.
    #[error("Concurrency conflict on {entity} '{id}'")]
    ConcurrencyConflict {
        /// The kind of document whose precondition failed.
        entity: String,
        /// The document key.
        id: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The backing store could not serve the request.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// A description of the infrastructure fault.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::ValidationError`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns true for errors the caller may resolve by retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::ConcurrencyConflict { .. })
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_invalid_interval_displays_bounds() {
        let error = EngineError::InvalidInterval {
            start: make_datetime("2025-01-06 18:00:00"),
            end: make_datetime("2025-01-06 17:00:00"),
            message: "end before start".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid interval [2025-01-06 18:00:00, 2025-01-06 17:00:00): end before start"
        );
    }

    #[test]
    fn test_invalid_state_transition_displays_states() {
        let error = EngineError::InvalidStateTransition {
            entity: "overtime_entry".to_string(),
            id: "ot_1".to_string(),
            from: "APROBADO".to_string(),
            to: "APROBADO".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid state transition for overtime_entry 'ot_1': APROBADO -> APROBADO"
        );
    }

    #[test]
    fn test_insufficient_balance_displays_amounts() {
        let error = EngineError::InsufficientBalance {
            employee_id: "emp_001".to_string(),
            requested: 10,
            available: 4,
        };
        assert_eq!(
            error.to_string(),
            "Insufficient balance for employee 'emp_001': requested 10, available 4"
        );
    }

    #[test]
    fn test_only_conflicts_are_retryable() {
        let conflict = EngineError::ConcurrencyConflict {
            entity: "hour_bank_counter".to_string(),
            id: "emp_001".to_string(),
        };
        assert!(conflict.is_retryable());
        assert!(!EngineError::validation("minutes", "must be positive").is_retryable());
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_not_found() -> EngineResult<()> {
            Err(EngineError::not_found("vacation_request", "vr_1"))
        }

        fn propagates_error() -> EngineResult<()> {
            returns_not_found()?;
            Ok(())
        }

        assert!(matches!(
            propagates_error(),
            Err(EngineError::NotFound { .. })
        ));
    }
}
