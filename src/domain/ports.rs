use std::path::{Path, PathBuf};

use crate::domain::language::TargetLanguage;
use crate::domain::model::{Credential, Document, QuotaStatus};
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;

/// Client of the external document translation service.
///
/// Failures must keep the quota / service / other distinction through
/// `TranslatorError::QuotaExceededError`, `TranslatorError::ServiceError`
/// and the remaining variants.
#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn usage(&self, credential: &Credential) -> Result<QuotaStatus>;

    /// Translates `document` and streams the translated bytes into `output`.
    async fn translate_document(
        &self,
        document: Document,
        output: &mut (dyn AsyncWrite + Unpin + Send),
        target: TargetLanguage,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<()>;
}

#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// `true` when the fixed remote address accepted a connection.
    async fn probe(&self) -> bool;
}

pub trait FileSelector {
    /// Resolves user input to a document path, or `None` when nothing usable was picked.
    fn select(&self, input: &str) -> Option<PathBuf>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Neutral,
    Green,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLabel {
    pub text: &'static str,
    pub color: StatusColor,
}

/// Window surface driven from the presentation loop only.
pub trait Presenter {
    fn show_status(&mut self, label: StatusLabel);
    fn set_translate_enabled(&mut self, enabled: bool);
    fn show_selected_file(&mut self, path: &Path);
    fn show_language(&mut self, language: TargetLanguage);
    fn show_notice(&mut self, message: &str);
    fn notify_success(&mut self, title: &str, message: &str);
    fn notify_error(&mut self, title: &str, message: &str);
}
