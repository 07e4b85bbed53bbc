use crate::domain::model::FailureReason;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Schedule API returned status {status}")]
    UnexpectedStatus { status: u16, api_answered: bool },

    #[error("Invalid schedule response: {message}")]
    InvalidSchedule { message: String },

    #[error("Location unavailable: {message}")]
    LocationUnavailable { message: String },

    #[error("Permission request failed: {message}")]
    PermissionPlatform { message: String },

    #[error("City name is empty")]
    EmptyInput,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },
}

impl ResolveError {
    pub fn invalid_schedule(message: impl Into<String>) -> Self {
        Self::InvalidSchedule {
            message: message.into(),
        }
    }

    pub fn location_unavailable(message: impl Into<String>) -> Self {
        Self::LocationUnavailable {
            message: message.into(),
        }
    }

    /// Maps a collaborator error onto the closed failure taxonomy.
    ///
    /// Configuration and local IO errors never occur inside a resolution
    /// attempt and have no reason.
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            Self::HttpError(_) => Some(FailureReason::NetworkError),
            Self::UnexpectedStatus { status, api_answered } => {
                let transport = FailureReason::NetworkError;
                // A 4xx the API wrapped in its own envelope is a request contract problem.
                if *api_answered && (400..500).contains(status) {
                    Some(FailureReason::more_specific(
                        transport,
                        FailureReason::InvalidScheduleResponse,
                    ))
                } else {
                    Some(transport)
                }
            }
            Self::InvalidSchedule { .. } | Self::SerializationError(_) => {
                Some(FailureReason::InvalidScheduleResponse)
            }
            Self::LocationUnavailable { .. } => Some(FailureReason::LocationUnavailable),
            Self::PermissionPlatform { .. } => Some(FailureReason::PermissionDenied(
                crate::domain::model::DenialCause::PlatformError,
            )),
            Self::EmptyInput => Some(FailureReason::EmptyInput),
            Self::IoError(_)
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DenialCause;

    #[test]
    fn test_server_errors_are_network_errors() {
        let err = ResolveError::UnexpectedStatus {
            status: 500,
            api_answered: true,
        };
        assert_eq!(err.reason(), Some(FailureReason::NetworkError));
    }

    #[test]
    fn test_rejected_request_prefers_invalid_response() {
        let err = ResolveError::UnexpectedStatus {
            status: 400,
            api_answered: true,
        };
        assert_eq!(err.reason(), Some(FailureReason::InvalidScheduleResponse));

        let bare = ResolveError::UnexpectedStatus {
            status: 404,
            api_answered: false,
        };
        assert_eq!(bare.reason(), Some(FailureReason::NetworkError));
    }

    #[test]
    fn test_platform_failure_is_distinct_denial() {
        let err = ResolveError::PermissionPlatform {
            message: "service crashed".to_string(),
        };
        assert_eq!(
            err.reason(),
            Some(FailureReason::PermissionDenied(DenialCause::PlatformError))
        );
    }

    #[test]
    fn test_config_errors_have_no_reason() {
        let err = ResolveError::MissingConfigError {
            field: "api.base_url".to_string(),
        };
        assert!(err.reason().is_none());
    }
}
