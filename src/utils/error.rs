use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration parse error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("API usage check failed: {source}")]
    UsageError {
        #[source]
        source: Box<TranslatorError>,
    },

    #[error("Character limit exceeded. Used {used} out of {limit}")]
    QuotaLimitReached { used: u64, limit: u64 },

    #[error("Quota Exceeded: {message}")]
    QuotaExceededError { message: String },

    #[error("DeepL API error: {message}")]
    ServiceError { status: Option<u16>, message: String },

    #[error("API request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Translation cancelled")]
    Cancelled,
}

/// Coarse error classes shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    QuotaExceeded,
    Service,
    Unexpected,
}

impl TranslatorError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. }
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Validation,
            Self::UsageError { source } => source.category(),
            Self::QuotaLimitReached { .. } | Self::QuotaExceededError { .. } => {
                ErrorCategory::QuotaExceeded
            }
            Self::ServiceError { .. } => ErrorCategory::Service,
            Self::TransportError(_)
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::Cancelled => ErrorCategory::Unexpected,
        }
    }

    /// Title of the notification that reports this error.
    pub fn report_title(&self) -> &'static str {
        match self {
            Self::UsageError { .. } | Self::QuotaLimitReached { .. } => "API Usage Error",
            Self::Cancelled => "Cancelled",
            _ => "Error",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { message } => message.clone(),
            Self::UsageError { source } => source.user_friendly_message(),
            Self::QuotaLimitReached { .. }
            | Self::QuotaExceededError { .. }
            | Self::ServiceError { .. }
            | Self::Cancelled => self.to_string(),
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => format!("Configuration problem: {}", self),
            Self::TransportError(e) => format!("An error occurred: {}", e),
            Self::IoError(e) => format!("An error occurred: {}", e),
            Self::SerializationError(e) => format!("An error occurred: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "Check the selected file and the configured DeepL auth key",
            ErrorCategory::QuotaExceeded => {
                "Wait for the quota to reset or upgrade the DeepL subscription"
            }
            ErrorCategory::Service => "Check the DeepL auth key and the document, then try again",
            ErrorCategory::Unexpected => "Check the network connection and file permissions, then try again",
        }
    }
}

pub type Result<T> = std::result::Result<T, TranslatorError>;
