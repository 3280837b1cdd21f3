//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while reconciling punches and
//! computing pay. Column-level problems are fatal for a batch; row-level
//! problems are reported per row by the callers that catch them.

use thiserror::Error;
use uuid::Uuid;

/// The main error type for the payroll engine.
///
/// All fallible operations in the engine return this error type, making it
/// easy to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::MissingColumns {
///     columns: vec!["Exit".to_string(), "Withdrawal".to_string()],
/// };
/// assert_eq!(error.to_string(), "Sheet is missing required columns: Exit, Withdrawal");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
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

    /// The input sheet lacks one or more required columns.
    #[error("Sheet is missing required columns: {}", columns.join(", "))]
    MissingColumns {
        /// The required column names that were not found.
        columns: Vec<String>,
    },

    /// The input sheet could not be read.
    #[error("Failed to read attendance sheet: {message}")]
    SheetReadError {
        /// A description of the read failure.
        message: String,
    },

    /// A clock field was absent or could not be parsed as a time of day.
    #[error("Invalid {field} time '{value}'")]
    InvalidTime {
        /// The field that was invalid ("entry" or "exit").
        field: String,
        /// The raw value that failed to parse.
        value: String,
    },

    /// A date value could not be parsed.
    #[error("Invalid date '{value}'")]
    InvalidDate {
        /// The raw value that failed to parse.
        value: String,
    },

    /// A deduction column held something other than a non-negative number.
    #[error("Invalid amount in column '{column}': '{value}'")]
    InvalidAmount {
        /// The column holding the value.
        column: String,
        /// The raw value that failed to parse.
        value: String,
    },

    /// The hourly rate was negative.
    #[error("Invalid hourly rate: {rate}")]
    InvalidRate {
        /// The rejected rate.
        rate: String,
    },

    /// A pay amount or batch total left the range a decimal can hold.
    #[error("Pay for punch {punch} is out of the supported amount range")]
    AmountOverflow {
        /// The punch whose pay overflowed.
        punch: String,
    },

    /// An operator decision could not be recorded against the correction ledger.
    #[error("Invalid correction for punch {punch}: {message}")]
    InvalidCorrection {
        /// The punch identity the decision targeted.
        punch: String,
        /// A description of what made the decision invalid.
        message: String,
    },

    /// No batch session exists for the given id.
    #[error("Batch session not found: {id}")]
    SessionNotFound {
        /// The session id that was not found.
        id: Uuid,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

impl From<csv::Error> for EngineError {
    fn from(error: csv::Error) -> Self {
        EngineError::SheetReadError {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_overflow_names_the_punch() {
        let error = EngineError::AmountOverflow {
            punch: "row 4".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Pay for punch row 4 is out of the supported amount range"
        );
    }

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/rules.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/rules.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_missing_columns_lists_every_column() {
        let error = EngineError::MissingColumns {
            columns: vec!["Entry".to_string()],
        };
        assert_eq!(error.to_string(), "Sheet is missing required columns: Entry");
    }

    #[test]
    fn test_invalid_time_displays_field_and_value() {
        let error = EngineError::InvalidTime {
            field: "exit".to_string(),
            value: "25:61".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid exit time '25:61'");
    }

    #[test]
    fn test_invalid_amount_displays_column_and_value() {
        let error = EngineError::InvalidAmount {
            column: "CashDeduction".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid amount in column 'CashDeduction': 'abc'"
        );
    }

    #[test]
    fn test_invalid_correction_displays_punch_and_message() {
        let error = EngineError::InvalidCorrection {
            punch: "row 4".to_string(),
            message: "no open ticket".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid correction for punch row 4: no open ticket"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_invalid_date() -> EngineResult<()> {
            Err(EngineError::InvalidDate {
                value: "yesterday".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_invalid_date()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
