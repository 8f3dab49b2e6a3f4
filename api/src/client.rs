//! `reqwest`-backed implementation of [`AnalysisBackend`].

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::backend::AnalysisBackend;
use crate::cancel::CancelToken;
use crate::config::BackendConfig;
use crate::error::{
    ClientError, ANALYSIS_FAILED, DOWNLOAD_FAILED, FETCH_RESULTS_FAILED, UPLOAD_FAILED,
    UPLOAD_MISSING_SESSION,
};
use crate::models::{AnalysisResult, ResultsEnvelope, SessionId};

/// A dataset picked by the user, read fully into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    session_id: Option<SessionId>,
}

/// Thin HTTP client for one backend origin. Performs no retries.
#[derive(Debug, Clone)]
pub struct SessionClient {
    http: reqwest::Client,
    config: BackendConfig,
}

impl SessionClient {
    pub fn new(config: BackendConfig) -> Self {
        Self::with_http(config, reqwest::Client::new())
    }

    pub fn with_http(config: BackendConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Sends `request`, mapping transport failures and non-2xx statuses through `fail`.
    async fn dispatch(
        &self,
        request: RequestBuilder,
        cancel: &CancelToken,
        fail: fn(String) -> ClientError,
        generic: &str,
    ) -> Result<Response, ClientError> {
        let response = cancel
            .run(request.send())
            .await
            .map_err(|_| ClientError::Cancelled)?
            .map_err(|err| {
                warn!(error = %err, "backend request failed");
                fail(generic.to_string())
            })?;

        let status = response.status();
        info!(url = %response.url(), %status, "backend responded");
        if status.is_success() {
            return Ok(response);
        }

        let detail = cancel
            .run(error_detail(response))
            .await
            .map_err(|_| ClientError::Cancelled)?;
        warn!(%status, detail = ?detail, "backend reported an error");
        Err(fail(detail.unwrap_or_else(|| generic.to_string())))
    }

    async fn decode<T: DeserializeOwned>(
        response: Response,
        cancel: &CancelToken,
        fail: fn(String) -> ClientError,
        generic: &str,
    ) -> Result<T, ClientError> {
        cancel
            .run(response.json::<T>())
            .await
            .map_err(|_| ClientError::Cancelled)?
            .map_err(|err| {
                warn!(error = %err, "backend response did not decode");
                fail(generic.to_string())
            })
    }
}

/// Pulls `detail` out of an error body when it is a plain string.
async fn error_detail(response: Response) -> Option<String> {
    let body: Value = response.json().await.ok()?;
    match body.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        _ => None,
    }
}

#[async_trait(?Send)]
impl AnalysisBackend for SessionClient {
    async fn submit(
        &self,
        file: UploadFile,
        cancel: &CancelToken,
    ) -> Result<SessionId, ClientError> {
        let url = self.config.endpoint(&["upload", ""])?;
        debug!(file = %file.name, bytes = file.bytes.len(), "uploading dataset");

        let part = Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str("text/csv")
            .map_err(|_| ClientError::Upload(UPLOAD_FAILED.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .dispatch(
                self.http.post(url).multipart(form),
                cancel,
                ClientError::Upload,
                UPLOAD_FAILED,
            )
            .await?;
        let body: UploadResponse =
            Self::decode(response, cancel, ClientError::Upload, UPLOAD_FAILED).await?;

        match body.session_id {
            Some(id) if !id.as_str().is_empty() => {
                info!(session_id = %id, "upload accepted");
                Ok(id)
            }
            _ => Err(ClientError::Upload(UPLOAD_MISSING_SESSION.to_string())),
        }
    }

    async fn trigger_analysis(
        &self,
        session_id: &SessionId,
        cancel: &CancelToken,
    ) -> Result<AnalysisResult, ClientError> {
        let url = self.config.endpoint(&["analyze", session_id.as_str()])?;
        info!(%session_id, "triggering analysis");
        let response = self
            .dispatch(
                self.http.post(url),
                cancel,
                ClientError::Analysis,
                ANALYSIS_FAILED,
            )
            .await?;
        Self::decode(response, cancel, ClientError::Analysis, ANALYSIS_FAILED).await
    }

    async fn fetch_results(
        &self,
        session_id: &SessionId,
        cancel: &CancelToken,
    ) -> Result<ResultsEnvelope, ClientError> {
        let url = self.config.endpoint(&["results", session_id.as_str()])?;
        let response = self
            .dispatch(
                self.http.get(url),
                cancel,
                ClientError::FetchResults,
                FETCH_RESULTS_FAILED,
            )
            .await?;
        Self::decode(
            response,
            cancel,
            ClientError::FetchResults,
            FETCH_RESULTS_FAILED,
        )
        .await
    }

    async fn fetch_resource(
        &self,
        url: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, ClientError> {
        let response = self
            .dispatch(
                self.http.get(url),
                cancel,
                ClientError::Download,
                DOWNLOAD_FAILED,
            )
            .await
            .map_err(|err| {
                if err.is_cancelled() {
                    err
                } else {
                    // Static files carry no user-facing detail.
                    ClientError::Download(DOWNLOAD_FAILED.to_string())
                }
            })?;
        let bytes = cancel
            .run(response.bytes())
            .await
            .map_err(|_| ClientError::Cancelled)?
            .map_err(|err| {
                warn!(error = %err, %url, "resource body interrupted");
                ClientError::Download(DOWNLOAD_FAILED.to_string())
            })?;
        Ok(bytes.to_vec())
    }

    fn resolve(&self, path: &str) -> String {
        self.config.resolve(path)
    }
}
