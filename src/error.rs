//! Error types for cultivar operations.
//!
//! Validation failures are plain values threaded back to the handler
//! that produced them; internal failures carry detail for server-side
//! logging while displaying a generic message to callers.

use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for cultivar operations
pub type Result<T> = std::result::Result<T, CultivarError>;

/// Error type covering artifact loading, validation, inference, and
/// report rendering.
#[derive(Error, Debug)]
pub enum CultivarError {
    /// Model artifact file not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact deserialization failed (corrupt or wrong format)
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    /// Classifier or decoder missing; permanent for the process lifetime
    #[error("Models not loaded properly. Please check model files.")]
    ModelsUnavailable,

    /// A required form field is absent or blank
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A field failed numeric parsing or bounds checking
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Inference failed; the payload is logged server-side, never shown
    #[error("Prediction failed. Please try again.")]
    PredictionFailed(String),

    /// PDF layout failed; the payload is logged server-side, never shown
    #[error("Failed to generate PDF report")]
    ReportFailed(String),

    /// Server could not bind or run
    #[error("Server error: {0}")]
    Server(String),
}

impl CultivarError {
    /// Process exit code for this error when surfaced from the CLI
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound(_) => ExitCode::from(3),
            Self::InvalidArtifact(_) => ExitCode::from(4),
            Self::ModelsUnavailable => ExitCode::from(6),
            Self::Io(_) => ExitCode::from(7),
            Self::Server(_) => ExitCode::from(8),
            _ => ExitCode::from(1),
        }
    }

    /// True for caller-recoverable validation failures (HTTP 400 class)
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::Validation { .. })
    }

    /// Detail string for server-side logging. Returns the hidden payload
    /// for information-hiding variants, the display message otherwise.
    pub fn internal_detail(&self) -> String {
        match self {
            Self::PredictionFailed(detail) | Self::ReportFailed(detail) => detail.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display_names_field() {
        let err = CultivarError::MissingField("rainfall".to_string());
        assert_eq!(err.to_string(), "Missing required field: rainfall");
    }

    #[test]
    fn test_validation_display_names_field() {
        let err = CultivarError::Validation {
            field: "pH Level".to_string(),
            message: "must be at most 14".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid pH Level: must be at most 14");
    }

    #[test]
    fn test_prediction_failed_hides_detail() {
        let err = CultivarError::PredictionFailed("leaf class 42 out of range".to_string());
        assert!(!err.to_string().contains("42"));
        assert!(err.internal_detail().contains("42"));
    }

    #[test]
    fn test_report_failed_hides_detail() {
        let err = CultivarError::ReportFailed("font lookup failed".to_string());
        assert_eq!(err.to_string(), "Failed to generate PDF report");
        assert!(err.internal_detail().contains("font"));
    }

    #[test]
    fn test_is_validation_classification() {
        assert!(CultivarError::MissingField("N".to_string()).is_validation());
        assert!(CultivarError::Validation {
            field: "Humidity".to_string(),
            message: "must be at least 0".to_string(),
        }
        .is_validation());
        assert!(!CultivarError::ModelsUnavailable.is_validation());
        assert!(!CultivarError::PredictionFailed(String::new()).is_validation());
    }

    #[test]
    fn test_exit_codes_distinct_for_artifact_errors() {
        let not_found = CultivarError::FileNotFound(PathBuf::from("model/crop_forest.bin"));
        let corrupt = CultivarError::InvalidArtifact("truncated".to_string());
        assert_ne!(not_found.exit_code(), corrupt.exit_code());
    }
}
