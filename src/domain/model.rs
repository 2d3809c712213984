use std::fmt;
use std::path::PathBuf;

use crate::domain::language::TargetLanguage;
use crate::utils::error::{Result, TranslatorError};
use crate::utils::validation::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityState {
    #[default]
    Checking,
    Connected,
    Disconnected,
}

impl ConnectivityState {
    pub fn from_probe(reachable: bool) -> Self {
        if reachable {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }

    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

/// Opaque DeepL auth key. Never printed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Free-tier keys carry a `:fx` suffix.
    pub fn is_free_tier(&self) -> bool {
        self.0.trim_end().ends_with(":fx")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_blank() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub source_path: PathBuf,
    pub target_language: TargetLanguage,
    pub credential: Credential,
}

impl TranslationRequest {
    pub fn new(
        source_path: impl Into<PathBuf>,
        target_language: TargetLanguage,
        credential: Credential,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            target_language,
            credential,
        }
    }
}

impl Validate for TranslationRequest {
    fn validate(&self) -> Result<()> {
        if self.source_path.as_os_str().is_empty() {
            return Err(TranslatorError::validation("Please select an input file."));
        }
        if self.credential.is_blank() {
            return Err(TranslatorError::validation(
                "No DeepL auth key configured. Set deepl.auth_key or DEEPL_AUTH_KEY.",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    pub used: u64,
    pub limit: u64,
    pub exceeded: bool,
}

impl QuotaStatus {
    /// A limit of zero means the account reports no character limit.
    pub fn from_counts(used: u64, limit: u64) -> Self {
        Self {
            used,
            limit,
            exceeded: limit > 0 && used >= limit,
        }
    }
}

/// Source document handed to the translation service.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_status_exceeded() {
        assert!(!QuotaStatus::from_counts(10, 500_000).exceeded);
        assert!(QuotaStatus::from_counts(500_000, 500_000).exceeded);
        assert!(QuotaStatus::from_counts(500_001, 500_000).exceeded);
        assert!(!QuotaStatus::from_counts(42, 0).exceeded);
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let key = Credential::new("0123-secret:fx");
        assert_eq!(format!("{:?}", key), "Credential(<redacted>)");
        assert!(key.is_free_tier());
        assert!(!Credential::new("0123-secret").is_free_tier());
    }

    #[test]
    fn test_request_validation() {
        let valid = TranslationRequest::new("/a/b/doc.pdf", TargetLanguage::Fr, Credential::new("k"));
        assert!(valid.validate().is_ok());

        let no_file = TranslationRequest::new("", TargetLanguage::Fr, Credential::new("k"));
        assert!(matches!(
            no_file.validate(),
            Err(TranslatorError::ValidationError { .. })
        ));

        let no_key = TranslationRequest::new("/a/b/doc.pdf", TargetLanguage::Fr, Credential::new(" "));
        assert!(matches!(
            no_key.validate(),
            Err(TranslatorError::ValidationError { .. })
        ));
    }
}
