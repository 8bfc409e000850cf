//! Error handling for the permission engine.
//!
//! This module provides:
//! - [`ConfigurationError`]: contract violations detected while parsing roles,
//!   actions, subjects or policy documents
//! - [`AuthError`]: the crate-wide error type, including the `Forbidden`
//!   signal produced by [`Ability::enforce`](crate::rbac::Ability::enforce)
//! - Stable, machine-readable error codes with category and severity
//! - Error logging with tracing and metrics integration
//!
//! A denied check is not an error: `can` returns `false`. Errors only signal
//! defects upstream (unknown role, unknown subject tag, malformed instance)
//! and callers must treat them as deny-and-log.

use metrics::counter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, warn};

// ═══════════════════════════════════════════════════════════════════════════════
// Result Type Alias
// ═══════════════════════════════════════════════════════════════════════════════

/// A specialized Result type for engine operations.
pub type Result<T> = std::result::Result<T, AuthError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Error Codes
// ═══════════════════════════════════════════════════════════════════════════════

/// Machine-readable error codes.
///
/// These codes are stable and can be used by callers for programmatic error
/// handling, e.g. when translating into a transport-level response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Configuration Errors (5000-5099)
    UnknownRole,
    UnknownAction,
    UnknownSubject,
    MissingSubjectTag,
    InvalidInstance,
    UnknownCondition,
    UnsupportedAction,
    InvalidPolicyDocument,

    // Authorization (4000-4099)
    Forbidden,

    // Environment (5100-5199)
    SettingsLoadFailed,
    IoError,
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub const fn numeric_code(&self) -> u32 {
        match self {
            Self::UnknownRole => 5000,
            Self::UnknownAction => 5001,
            Self::UnknownSubject => 5002,
            Self::MissingSubjectTag => 5003,
            Self::InvalidInstance => 5004,
            Self::UnknownCondition => 5005,
            Self::UnsupportedAction => 5006,
            Self::InvalidPolicyDocument => 5007,

            Self::Forbidden => 4001,

            Self::SettingsLoadFailed => 5100,
            Self::IoError => 5101,
        }
    }

    /// Get the error category for grouping.
    pub const fn category(&self) -> &'static str {
        match self.numeric_code() {
            4000..=4099 => "authorization",
            5000..=5099 => "configuration",
            5100..=5199 => "environment",
            _ => "unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Severity
// ═══════════════════════════════════════════════════════════════════════════════

/// Severity level for errors (affects logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Expected outcomes such as a denied action
    Low,
    /// Bad input at a parsing boundary
    Medium,
    /// Defects in the policy or its environment
    High,
}

impl ErrorSeverity {
    /// Get severity based on error code.
    pub const fn from_code(code: &ErrorCode) -> Self {
        match code {
            ErrorCode::Forbidden => Self::Low,

            ErrorCode::UnknownAction
            | ErrorCode::UnknownSubject
            | ErrorCode::MissingSubjectTag
            | ErrorCode::InvalidInstance => Self::Medium,

            ErrorCode::UnknownRole
            | ErrorCode::UnknownCondition
            | ErrorCode::UnsupportedAction
            | ErrorCode::InvalidPolicyDocument
            | ErrorCode::SettingsLoadFailed
            | ErrorCode::IoError => Self::High,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Configuration Error
// ═══════════════════════════════════════════════════════════════════════════════

/// A programming or configuration defect detected at a parsing boundary.
///
/// Always fatal to the current check; never converted into a silent deny.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unknown role: {0:?}")]
    UnknownRole(String),

    #[error("unknown action: {0:?}")]
    UnknownAction(String),

    #[error("unknown subject tag: {0:?}")]
    UnknownSubject(String),

    #[error("subject instance does not declare its `type` tag")]
    MissingSubjectTag,

    #[error("invalid {subject} instance: {reason}")]
    InvalidInstance { subject: String, reason: String },

    #[error("unknown condition: {0:?}")]
    UnknownCondition(String),

    #[error("action `{action}` is not supported by subject `{subject}`")]
    UnsupportedAction { action: String, subject: String },

    #[error("invalid policy document: {0}")]
    InvalidPolicyDocument(String),
}

impl ConfigurationError {
    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownRole(_) => ErrorCode::UnknownRole,
            Self::UnknownAction(_) => ErrorCode::UnknownAction,
            Self::UnknownSubject(_) => ErrorCode::UnknownSubject,
            Self::MissingSubjectTag => ErrorCode::MissingSubjectTag,
            Self::InvalidInstance { .. } => ErrorCode::InvalidInstance,
            Self::UnknownCondition(_) => ErrorCode::UnknownCondition,
            Self::UnsupportedAction { .. } => ErrorCode::UnsupportedAction,
            Self::InvalidPolicyDocument(_) => ErrorCode::InvalidPolicyDocument,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Main Error Type
// ═══════════════════════════════════════════════════════════════════════════════

/// The main error type for the crate.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("access denied: {reason}")]
    Forbidden { reason: String },

    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AuthError {
    /// Create a forbidden error.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Configuration(e) => e.code(),
            Self::Forbidden { .. } => ErrorCode::Forbidden,
            Self::Settings(_) => ErrorCode::SettingsLoadFailed,
            Self::Io { .. } => ErrorCode::IoError,
        }
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::from_code(&self.code())
    }

    /// Whether this error is an upstream configuration defect.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Whether this error is a denied action.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Log this error with appropriate severity and count it.
    pub fn log(&self) {
        let code = self.code();
        let category = code.category();

        match self.severity() {
            ErrorSeverity::High => {
                error!(
                    error_code = %code,
                    numeric_code = code.numeric_code(),
                    category = category,
                    error = %self,
                    "Authorization engine defect"
                );
            }
            ErrorSeverity::Medium => {
                warn!(
                    error_code = %code,
                    category = category,
                    error = %self,
                    "Rejected malformed authorization input"
                );
            }
            ErrorSeverity::Low => {
                tracing::debug!(
                    error_code = %code,
                    category = category,
                    error = %self,
                    "Access denied"
                );
            }
        }

        counter!(
            "saas_auth_errors_total",
            "code" => code.to_string(),
            "category" => category,
        )
        .increment(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_codes_are_in_range() {
        let errors = [
            ConfigurationError::UnknownRole("OWNER".into()),
            ConfigurationError::UnknownAction("fly".into()),
            ConfigurationError::UnknownSubject("Widget".into()),
            ConfigurationError::MissingSubjectTag,
            ConfigurationError::UnknownCondition("never".into()),
        ];
        for err in errors {
            assert_eq!(err.code().category(), "configuration");
        }
    }

    #[test]
    fn test_auth_error_from_configuration() {
        let err: AuthError = ConfigurationError::UnknownRole("OWNER".into()).into();
        assert!(err.is_configuration());
        assert_eq!(err.code(), ErrorCode::UnknownRole);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.to_string(), "unknown role: \"OWNER\"");
    }

    #[test]
    fn test_forbidden_is_low_severity() {
        let err = AuthError::forbidden("role MEMBER may not delete Project");
        assert!(err.is_forbidden());
        assert_eq!(err.code().numeric_code(), 4001);
        assert_eq!(err.code().category(), "authorization");
        assert_eq!(err.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::MissingSubjectTag).unwrap();
        assert_eq!(json, "\"MISSING_SUBJECT_TAG\"");
    }

    #[test]
    fn test_configuration_severity() {
        let medium = [
            ConfigurationError::UnknownAction("fly".into()),
            ConfigurationError::UnknownSubject("Widget".into()),
            ConfigurationError::MissingSubjectTag,
            ConfigurationError::InvalidInstance {
                subject: "Project".into(),
                reason: "missing field `ownerId`".into(),
            },
        ];
        for err in medium {
            assert_eq!(AuthError::from(err).severity(), ErrorSeverity::Medium);
        }

        let high = [
            ConfigurationError::UnknownRole("OWNER".into()),
            ConfigurationError::UnknownCondition("never".into()),
            ConfigurationError::UnsupportedAction {
                action: "export".into(),
                subject: "Project".into(),
            },
            ConfigurationError::InvalidPolicyDocument("bad".into()),
        ];
        for err in high {
            assert_eq!(AuthError::from(err).severity(), ErrorSeverity::High);
        }
    }

    #[test]
    fn test_log_counts_error() {
        use metrics_util::debugging::{DebugValue, DebuggingRecorder};

        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        metrics::with_local_recorder(&recorder, || {
            AuthError::from(ConfigurationError::MissingSubjectTag).log();
        });

        let counted: Vec<u64> = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter(|(key, ..)| key.key().name() == "saas_auth_errors_total")
            .filter_map(|(_, _, _, value)| match value {
                DebugValue::Counter(n) => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(counted, vec![1]);
    }
}
