use std::future::Future;
use std::time::Duration;

use crate::core::{Credential, Document, QuotaStatus, TargetLanguage, TranslationService};
use crate::utils::error::{Result, TranslatorError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

pub const DEEPL_FREE_API_URL: &str = "https://api-free.deepl.com";
pub const DEEPL_PRO_API_URL: &str = "https://api.deepl.com";

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_POLL_INTERVAL: Duration = Duration::from_secs(30);

const HTTP_QUOTA_EXCEEDED: u16 = 456;

#[derive(Debug, Clone)]
pub struct DeepLSettings {
    /// Overrides the free/pro endpoint chosen from the key.
    pub server_url: Option<String>,
    pub max_poll_interval: Duration,
}

impl Default for DeepLSettings {
    fn default() -> Self {
        Self {
            server_url: None,
            max_poll_interval: DEFAULT_MAX_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    character_count: Option<u64>,
    character_limit: Option<u64>,
}

#[derive(Deserialize)]
struct DocumentHandle {
    document_id: String,
    document_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DocumentState {
    Queued,
    Translating,
    Done,
    Error,
}

#[derive(Debug, Deserialize)]
struct DocumentStatus {
    status: DocumentState,
    seconds_remaining: Option<u64>,
    billed_characters: Option<u64>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    detail: Option<String>,
}

/// DeepL v2 REST client covering usage and document translation.
pub struct DeepLClient {
    client: Client,
    settings: DeepLSettings,
}

impl DeepLClient {
    pub fn new(settings: DeepLSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pdf-translator/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, settings })
    }

    fn base_url(&self, credential: &Credential) -> String {
        match &self.settings.server_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if credential.is_free_tier() => DEEPL_FREE_API_URL.to_string(),
            None => DEEPL_PRO_API_URL.to_string(),
        }
    }

    fn auth_header(credential: &Credential) -> String {
        format!("DeepL-Auth-Key {}", credential.expose().trim())
    }

    async fn upload(
        &self,
        base: &str,
        document: Document,
        target: TargetLanguage,
        credential: &Credential,
    ) -> Result<DocumentHandle> {
        let size = document.bytes.len();
        let form = Form::new()
            .text("target_lang", target.code())
            .part("file", Part::bytes(document.bytes).file_name(document.file_name));

        tracing::debug!("Uploading document ({} bytes) to {}/v2/document", size, base);
        let response = self
            .client
            .post(format!("{}/v2/document", base))
            .header("Authorization", Self::auth_header(credential))
            .multipart(form)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    async fn poll_status(
        &self,
        base: &str,
        handle: &DocumentHandle,
        credential: &Credential,
    ) -> Result<DocumentStatus> {
        let response = self
            .client
            .post(format!("{}/v2/document/{}", base, handle.document_id))
            .header("Authorization", Self::auth_header(credential))
            .form(&[("document_key", handle.document_key.as_str())])
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    async fn wait_until_done(
        &self,
        base: &str,
        handle: &DocumentHandle,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<()> {
        loop {
            let status = cancellable(cancel, self.poll_status(base, handle, credential)).await?;
            tracing::debug!(
                "Document {} is {:?}, {:?}s remaining",
                handle.document_id,
                status.status,
                status.seconds_remaining
            );

            match status.status {
                DocumentState::Done => {
                    if let Some(billed) = status.billed_characters {
                        tracing::info!("Document translated, billed characters: {}", billed);
                    }
                    return Ok(());
                }
                DocumentState::Error => {
                    return Err(TranslatorError::ServiceError {
                        status: None,
                        message: status
                            .error_message
                            .unwrap_or_else(|| "Error occurred while translating document".to_string()),
                    });
                }
                DocumentState::Queued | DocumentState::Translating => {
                    let wait = Duration::from_secs(status.seconds_remaining.unwrap_or(1))
                        .min(self.settings.max_poll_interval)
                        .max(MIN_POLL_INTERVAL);
                    cancellable(cancel, async {
                        tokio::time::sleep(wait).await;
                        Ok::<_, TranslatorError>(())
                    })
                    .await?;
                }
            }
        }
    }

    async fn download(
        &self,
        base: &str,
        handle: &DocumentHandle,
        output: &mut (dyn AsyncWrite + Unpin + Send),
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        let response = self
            .client
            .post(format!("{}/v2/document/{}/result", base, handle.document_id))
            .header("Authorization", Self::auth_header(credential))
            .form(&[("document_key", handle.document_key.as_str())])
            .send()
            .await?;
        let mut response = check_status(response).await?;

        let mut written = 0u64;
        while let Some(chunk) = cancellable(cancel, async {
            response.chunk().await.map_err(TranslatorError::from)
        })
        .await?
        {
            output.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        output.flush().await?;
        Ok(written)
    }
}

#[async_trait]
impl TranslationService for DeepLClient {
    async fn usage(&self, credential: &Credential) -> Result<QuotaStatus> {
        let url = format!("{}/v2/usage", self.base_url(credential));
        tracing::debug!("Querying usage from {}", url);

        let response = self
            .client
            .get(url)
            .header("Authorization", Self::auth_header(credential))
            .send()
            .await?;
        let usage: UsageResponse = check_status(response).await?.json().await?;

        Ok(QuotaStatus::from_counts(
            usage.character_count.unwrap_or(0),
            usage.character_limit.unwrap_or(0),
        ))
    }

    async fn translate_document(
        &self,
        document: Document,
        output: &mut (dyn AsyncWrite + Unpin + Send),
        target: TargetLanguage,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let base = self.base_url(credential);

        let handle = cancellable(cancel, self.upload(&base, document, target, credential)).await?;
        tracing::info!("Document uploaded, id {}", handle.document_id);

        self.wait_until_done(&base, &handle, credential, cancel).await?;

        let written = self.download(&base, &handle, output, credential, cancel).await?;
        tracing::debug!("Downloaded {} translated bytes", written);
        Ok(())
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TranslatorError::Cancelled),
        result = fut => result,
    }
}

/// Maps DeepL HTTP failures onto quota / service errors.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(status, &body);
    tracing::debug!("DeepL responded {}: {}", status, detail);

    Err(match status.as_u16() {
        HTTP_QUOTA_EXCEEDED => TranslatorError::QuotaExceededError {
            message: format!("Quota for this billing period has been exceeded, message: {}", detail),
        },
        403 => TranslatorError::ServiceError {
            status: Some(403),
            message: format!("Authorization failure, check auth_key, message: {}", detail),
        },
        429 => TranslatorError::ServiceError {
            status: Some(429),
            message: format!("Too many requests, DeepL servers are currently experiencing high load, message: {}", detail),
        },
        404 => TranslatorError::ServiceError {
            status: Some(404),
            message: format!("Not found, check server_url, message: {}", detail),
        },
        code => TranslatorError::ServiceError {
            status: Some(code),
            message: format!("HTTP {}, message: {}", code, detail),
        },
    })
}

fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(ApiErrorBody {
        message: Some(message),
        detail,
    }) = serde_json::from_str::<ApiErrorBody>(body)
    {
        return match detail {
            Some(detail) => format!("{}, {}", message, detail),
            None => message,
        };
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> DeepLClient {
        DeepLClient::new(DeepLSettings {
            server_url: Some(server.base_url()),
            ..DeepLSettings::default()
        })
        .unwrap()
    }

    fn document() -> Document {
        Document {
            file_name: "doc.pdf".to_string(),
            bytes: b"%PDF-1.4 hello".to_vec(),
        }
    }

    #[test]
    fn test_base_url_follows_key_tier() {
        let client = DeepLClient::new(DeepLSettings::default()).unwrap();
        assert_eq!(client.base_url(&Credential::new("abc:fx")), DEEPL_FREE_API_URL);
        assert_eq!(client.base_url(&Credential::new("abc")), DEEPL_PRO_API_URL);

        let pinned = DeepLClient::new(DeepLSettings {
            server_url: Some("http://localhost:3000/".to_string()),
            ..DeepLSettings::default()
        })
        .unwrap();
        assert_eq!(pinned.base_url(&Credential::new("abc:fx")), "http://localhost:3000");
    }

    #[test]
    fn test_error_detail_prefers_json_message() {
        let detail = error_detail(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Bad request","detail":"Value for 'target_lang' not supported."}"#,
        );
        assert_eq!(detail, "Bad request, Value for 'target_lang' not supported.");
        assert_eq!(error_detail(StatusCode::FORBIDDEN, ""), "Forbidden");
        assert_eq!(error_detail(StatusCode::BAD_GATEWAY, " upstream down "), "upstream down");
    }

    #[tokio::test]
    async fn test_usage_reports_counts() {
        let server = MockServer::start();
        let usage_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v2/usage")
                .header("Authorization", "DeepL-Auth-Key test-key:fx");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"character_count": 180118, "character_limit": 500000}));
        });

        let quota = client_for(&server)
            .usage(&Credential::new("test-key:fx"))
            .await
            .unwrap();

        usage_mock.assert();
        assert_eq!(quota, QuotaStatus::from_counts(180118, 500000));
        assert!(!quota.exceeded);
    }

    #[tokio::test]
    async fn test_usage_auth_failure_is_service_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v2/usage");
            then.status(403).json_body(json!({"message": "Wrong endpoint"}));
        });

        let err = client_for(&server)
            .usage(&Credential::new("bad-key"))
            .await
            .unwrap_err();

        match err {
            TranslatorError::ServiceError { status, message } => {
                assert_eq!(status, Some(403));
                assert!(message.contains("Wrong endpoint"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_translate_document_uploads_polls_and_streams_result() {
        let server = MockServer::start();
        let upload = server.mock(|when, then| {
            when.method(POST)
                .path("/v2/document")
                .header("Authorization", "DeepL-Auth-Key test-key")
                .body_contains("target_lang")
                .body_contains("doc.pdf");
            then.status(200)
                .json_body(json!({"document_id": "doc-1", "document_key": "key-1"}));
        });
        let status = server.mock(|when, then| {
            when.method(POST)
                .path("/v2/document/doc-1")
                .body_contains("document_key=key-1");
            then.status(200)
                .json_body(json!({"document_id": "doc-1", "status": "done", "billed_characters": 1337}));
        });
        let result = server.mock(|when, then| {
            when.method(POST)
                .path("/v2/document/doc-1/result")
                .body_contains("document_key=key-1");
            then.status(200)
                .header("Content-Type", "application/pdf")
                .body("%PDF-1.4 bonjour");
        });

        let mut output: Vec<u8> = Vec::new();
        client_for(&server)
            .translate_document(
                document(),
                &mut output,
                TargetLanguage::Fr,
                &Credential::new("test-key"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        upload.assert();
        status.assert();
        result.assert();
        assert_eq!(output, b"%PDF-1.4 bonjour");
    }

    #[tokio::test]
    async fn test_quota_exceeded_during_download_is_quota_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v2/document");
            then.status(200)
                .json_body(json!({"document_id": "doc-2", "document_key": "key-2"}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/v2/document/doc-2");
            then.status(200)
                .json_body(json!({"document_id": "doc-2", "status": "done"}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/v2/document/doc-2/result");
            then.status(456)
                .json_body(json!({"message": "Quota exceeded"}));
        });

        let mut output: Vec<u8> = Vec::new();
        let err = client_for(&server)
            .translate_document(
                document(),
                &mut output,
                TargetLanguage::De,
                &Credential::new("test-key"),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TranslatorError::QuotaExceededError { .. }));
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_document_error_status_is_service_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v2/document");
            then.status(200)
                .json_body(json!({"document_id": "doc-3", "document_key": "key-3"}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/v2/document/doc-3");
            then.status(200).json_body(json!({
                "document_id": "doc-3",
                "status": "error",
                "error_message": "Source and target language are equal."
            }));
        });

        let mut output: Vec<u8> = Vec::new();
        let err = client_for(&server)
            .translate_document(
                document(),
                &mut output,
                TargetLanguage::EnUs,
                &Credential::new("test-key"),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        match err {
            TranslatorError::ServiceError { status, message } => {
                assert_eq!(status, None);
                assert_eq!(message, "Source and target language are equal.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_upload() {
        let server = MockServer::start();
        let upload = server.mock(|when, then| {
            when.method(POST).path("/v2/document");
            then.status(200)
                .json_body(json!({"document_id": "doc-4", "document_key": "key-4"}));
        });

        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut output: Vec<u8> = Vec::new();
        let err = client_for(&server)
            .translate_document(
                document(),
                &mut output,
                TargetLanguage::Fr,
                &Credential::new("test-key"),
                &cancel,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TranslatorError::Cancelled));
        assert_eq!(upload.hits(), 0);
    }
}
