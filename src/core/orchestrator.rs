use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::core::{
    Credential, Document, QuotaStatus, TargetLanguage, TranslationRequest, TranslationResult,
    TranslationService,
};
use crate::utils::error::{Result, TranslatorError};
use crate::utils::validation::Validate;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

/// `translated_<LANG>_<file name>` next to the source document.
pub fn derive_output_path(source: &Path, target: TargetLanguage) -> Result<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| {
        TranslatorError::validation(format!(
            "'{}' does not name a file",
            source.display()
        ))
    })?;

    let mut output_name = OsString::from(format!("translated_{}_", target.code()));
    output_name.push(file_name);

    Ok(match source.parent() {
        Some(dir) => dir.join(output_name),
        None => PathBuf::from(output_name),
    })
}

/// Hidden sibling the translation is streamed into before it is renamed.
fn partial_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    if let Some(file_name) = output.file_name() {
        name.push(file_name);
    }
    name.push(".part");
    output.with_file_name(name)
}

pub struct TranslationOrchestrator<S: TranslationService> {
    service: S,
}

impl<S: TranslationService> TranslationOrchestrator<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Validate, check quota, translate, and return where the result landed.
    pub async fn translate(
        &self,
        request: TranslationRequest,
        cancel: CancellationToken,
    ) -> Result<TranslationResult> {
        request.validate()?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TranslatorError::Cancelled),
            quota = self.check_usage(&request.credential) => { quota?; }
        }

        let output_path = derive_output_path(&request.source_path, request.target_language)?;
        tracing::info!(
            source = %request.source_path.display(),
            output = %output_path.display(),
            target = %request.target_language,
            "Starting document translation"
        );

        if cancel.is_cancelled() {
            return Err(TranslatorError::Cancelled);
        }
        let bytes = tokio::fs::read(&request.source_path).await?;
        let document = Document {
            file_name: request
                .source_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            bytes,
        };

        let partial = partial_path(&output_path);
        match self
            .write_translation(document, &partial, &request, &cancel)
            .await
        {
            Ok(()) => {
                if let Err(e) = tokio::fs::rename(&partial, &output_path).await {
                    discard_partial(&partial).await;
                    return Err(e.into());
                }
                tracing::info!("Translation completed and saved to: {}", output_path.display());
                Ok(TranslationResult { output_path })
            }
            Err(e) => {
                discard_partial(&partial).await;
                Err(e)
            }
        }
    }

    async fn check_usage(&self, credential: &Credential) -> Result<QuotaStatus> {
        let quota = self
            .service
            .usage(credential)
            .await
            .map_err(|e| TranslatorError::UsageError { source: Box::new(e) })?;

        if quota.exceeded {
            tracing::warn!(
                "Character limit exceeded. Used {} out of {}",
                quota.used,
                quota.limit
            );
            return Err(TranslatorError::QuotaLimitReached {
                used: quota.used,
                limit: quota.limit,
            });
        }

        tracing::info!("Characters used: {} out of {}", quota.used, quota.limit);
        Ok(quota)
    }

    async fn write_translation(
        &self,
        document: Document,
        partial: &Path,
        request: &TranslationRequest,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut file = tokio::fs::File::create(partial).await?;
        self.service
            .translate_document(
                document,
                &mut file,
                request.target_language,
                &request.credential,
                cancel,
            )
            .await?;
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }
}

async fn discard_partial(partial: &Path) {
    match tokio::fs::remove_file(partial).await {
        Ok(()) => tracing::debug!("Removed partial output {}", partial.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            "Could not remove partial output {}: {}",
            partial.display(),
            e
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Credential;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::io::AsyncWrite;

    #[derive(Clone, Copy)]
    enum Outcome {
        Translate,
        QuotaMidStream,
        ServiceFailure,
    }

    #[derive(Clone)]
    struct MockService {
        quota: QuotaStatus,
        outcome: Outcome,
        usage_calls: Arc<AtomicUsize>,
        translate_calls: Arc<AtomicUsize>,
    }

    impl MockService {
        fn new(quota: QuotaStatus, outcome: Outcome) -> Self {
            Self {
                quota,
                outcome,
                usage_calls: Arc::new(AtomicUsize::new(0)),
                translate_calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn external_calls(&self) -> usize {
            self.usage_calls.load(Ordering::SeqCst) + self.translate_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranslationService for MockService {
        async fn usage(&self, _credential: &Credential) -> Result<QuotaStatus> {
            self.usage_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.quota)
        }

        async fn translate_document(
            &self,
            document: Document,
            output: &mut (dyn AsyncWrite + Unpin + Send),
            target: TargetLanguage,
            _credential: &Credential,
            _cancel: &CancellationToken,
        ) -> Result<()> {
            self.translate_calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Outcome::Translate => {
                    output.write_all(target.code().as_bytes()).await?;
                    output.write_all(b":").await?;
                    output.write_all(&document.bytes).await?;
                    Ok(())
                }
                Outcome::QuotaMidStream => {
                    output.write_all(b"%PDF-1.7 partial").await?;
                    Err(TranslatorError::QuotaExceededError {
                        message: "Quota for this billing period has been exceeded".to_string(),
                    })
                }
                Outcome::ServiceFailure => Err(TranslatorError::ServiceError {
                    status: Some(400),
                    message: "Document format not supported".to_string(),
                }),
            }
        }
    }

    fn write_source(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"hello").unwrap();
        path
    }

    fn open_quota() -> QuotaStatus {
        QuotaStatus::from_counts(100, 500_000)
    }

    #[test]
    fn test_derive_output_path() {
        let output = derive_output_path(Path::new("/a/b/doc.pdf"), TargetLanguage::Fr).unwrap();
        assert_eq!(output, PathBuf::from("/a/b/translated_FR_doc.pdf"));

        let output = derive_output_path(Path::new("doc.pdf"), TargetLanguage::EnUs).unwrap();
        assert_eq!(output, PathBuf::from("translated_EN-US_doc.pdf"));

        assert!(derive_output_path(Path::new("/"), TargetLanguage::Fr).is_err());
    }

    #[test]
    fn test_partial_path_is_hidden_sibling() {
        let partial = partial_path(Path::new("/a/b/translated_FR_doc.pdf"));
        assert_eq!(partial, PathBuf::from("/a/b/.translated_FR_doc.pdf.part"));
    }

    #[tokio::test]
    async fn test_empty_credential_makes_no_external_calls() {
        let service = MockService::new(open_quota(), Outcome::Translate);
        let orchestrator = TranslationOrchestrator::new(service.clone());

        for key in ["", "   ", "\t\n"] {
            let request =
                TranslationRequest::new("/a/b/doc.pdf", TargetLanguage::Fr, Credential::new(key));
            let result = orchestrator.translate(request, CancellationToken::new()).await;
            assert!(matches!(result, Err(TranslatorError::ValidationError { .. })));
        }

        assert_eq!(service.external_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_source_path_makes_no_external_calls() {
        let service = MockService::new(open_quota(), Outcome::Translate);
        let orchestrator = TranslationOrchestrator::new(service.clone());

        let request = TranslationRequest::new("", TargetLanguage::Fr, Credential::new("key"));
        let result = orchestrator.translate(request, CancellationToken::new()).await;

        assert!(matches!(result, Err(TranslatorError::ValidationError { .. })));
        assert_eq!(service.external_calls(), 0);
    }

    #[tokio::test]
    async fn test_exceeded_quota_aborts_before_translate() {
        let dir = TempDir::new().unwrap();
        let source = write_source(&dir);
        let service = MockService::new(QuotaStatus::from_counts(500_000, 500_000), Outcome::Translate);
        let orchestrator = TranslationOrchestrator::new(service.clone());

        let request = TranslationRequest::new(&source, TargetLanguage::De, Credential::new("key"));
        let err = orchestrator
            .translate(request, CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            TranslatorError::QuotaLimitReached { used, limit } => {
                assert_eq!(used, 500_000);
                assert_eq!(limit, 500_000);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(service.usage_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.translate_calls.load(Ordering::SeqCst), 0);
        assert!(!dir.path().join("translated_DE_doc.pdf").exists());
    }

    #[tokio::test]
    async fn test_successful_translation_lands_next_to_source() {
        let dir = TempDir::new().unwrap();
        let source = write_source(&dir);
        let orchestrator = TranslationOrchestrator::new(MockService::new(open_quota(), Outcome::Translate));

        let request = TranslationRequest::new(&source, TargetLanguage::Fr, Credential::new("key"));
        let result = orchestrator
            .translate(request, CancellationToken::new())
            .await
            .unwrap();

        let expected = dir.path().join("translated_FR_doc.pdf");
        assert_eq!(result.output_path, expected);
        assert_eq!(std::fs::read(&expected).unwrap(), b"FR:hello");
        assert!(!dir.path().join(".translated_FR_doc.pdf.part").exists());
    }

    #[tokio::test]
    async fn test_mid_stream_quota_failure_discards_partial_output() {
        let dir = TempDir::new().unwrap();
        let source = write_source(&dir);
        let orchestrator =
            TranslationOrchestrator::new(MockService::new(open_quota(), Outcome::QuotaMidStream));

        let request = TranslationRequest::new(&source, TargetLanguage::Fr, Credential::new("key"));
        let err = orchestrator
            .translate(request, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, TranslatorError::QuotaExceededError { .. }));
        assert!(!dir.path().join("translated_FR_doc.pdf").exists());
        assert!(!dir.path().join(".translated_FR_doc.pdf.part").exists());
    }

    #[tokio::test]
    async fn test_service_failure_is_reported_as_service_error() {
        let dir = TempDir::new().unwrap();
        let source = write_source(&dir);
        let orchestrator =
            TranslationOrchestrator::new(MockService::new(open_quota(), Outcome::ServiceFailure));

        let request = TranslationRequest::new(&source, TargetLanguage::Fr, Credential::new("key"));
        let err = orchestrator
            .translate(request, CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.category(), crate::utils::error::ErrorCategory::Service);
        assert_eq!(err.user_friendly_message(), "DeepL API error: Document format not supported");
    }

    #[tokio::test]
    async fn test_missing_source_file_is_unexpected_error() {
        let dir = TempDir::new().unwrap();
        let orchestrator = TranslationOrchestrator::new(MockService::new(open_quota(), Outcome::Translate));

        let request = TranslationRequest::new(
            dir.path().join("missing.pdf"),
            TargetLanguage::Fr,
            Credential::new("key"),
        );
        let err = orchestrator
            .translate(request, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, TranslatorError::IoError(_)));
        assert!(err.user_friendly_message().starts_with("An error occurred:"));
    }

    #[tokio::test]
    async fn test_failed_rename_discards_partial_output() {
        let dir = TempDir::new().unwrap();
        let source = write_source(&dir);
        let blocker = dir.path().join("translated_FR_doc.pdf");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep.txt"), b"occupied").unwrap();
        let orchestrator = TranslationOrchestrator::new(MockService::new(open_quota(), Outcome::Translate));

        let request = TranslationRequest::new(&source, TargetLanguage::Fr, Credential::new("key"));
        let err = orchestrator
            .translate(request, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, TranslatorError::IoError(_)));
        assert!(blocker.is_dir());
        assert!(!dir.path().join(".translated_FR_doc.pdf.part").exists());
    }

    #[tokio::test]
    async fn test_cancel_before_usage_check_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let source = write_source(&dir);
        let service = MockService::new(open_quota(), Outcome::Translate);
        let orchestrator = TranslationOrchestrator::new(service.clone());

        let cancel = CancellationToken::new();
        cancel.cancel();
        let request = TranslationRequest::new(&source, TargetLanguage::Fr, Credential::new("key"));
        let err = orchestrator.translate(request, cancel).await.unwrap_err();

        assert!(matches!(err, TranslatorError::Cancelled));
        assert_eq!(service.external_calls(), 0);
        assert!(!dir.path().join(".translated_FR_doc.pdf.part").exists());
        assert!(!dir.path().join("translated_FR_doc.pdf").exists());
    }
}
