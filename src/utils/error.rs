use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Unknown courier: {name}")]
    UnknownCourier { name: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("{courier} returned status code {status}")]
    HttpStatus { courier: String, status: u16 },

    #[error("Unexpected response from {courier}: {message}")]
    UnexpectedResponse { courier: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl TrackError {
    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            TrackError::UnknownCourier { name } => format!("Unknown courier: {}", name),
            TrackError::ApiError(_) | TrackError::HttpStatus { .. } => {
                "Courier backend could not be reached".to_string()
            }
            TrackError::UnexpectedResponse { courier, .. } => {
                format!("{} sent a response that could not be read", courier)
            }
            TrackError::IoError(e) => format!("File access failed: {}", e),
            TrackError::SerializationError(e) => format!("Invalid JSON data: {}", e),
            TrackError::ConfigValidationError { .. }
            | TrackError::InvalidConfigValueError { .. } => {
                format!("Invalid configuration: {}", self)
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            TrackError::UnknownCourier { .. } => 1,
            TrackError::ConfigValidationError { .. }
            | TrackError::InvalidConfigValueError { .. } => 2,
            _ => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;
