use async_trait::async_trait;

use crate::cancel::CancelToken;
use crate::client::UploadFile;
use crate::error::ClientError;
use crate::models::{AnalysisResult, ResultsEnvelope, SessionId};

/// Calls the session flow makes against the analysis backend.
///
/// Each call resolves or fails exactly once; no retries happen behind this
/// seam. Every call observes `cancel` and resolves to
/// [`ClientError::Cancelled`] once the scope is cancelled.
#[async_trait(?Send)]
pub trait AnalysisBackend {
    /// `POST /upload/`. The caller has already checked the file is a CSV.
    async fn submit(&self, file: UploadFile, cancel: &CancelToken)
        -> Result<SessionId, ClientError>;

    /// `POST /analyze/{id}`. Runs the whole computation; 10-30 s is typical.
    async fn trigger_analysis(
        &self,
        session_id: &SessionId,
        cancel: &CancelToken,
    ) -> Result<AnalysisResult, ClientError>;

    /// `GET /results/{id}`.
    async fn fetch_results(
        &self,
        session_id: &SessionId,
        cancel: &CancelToken,
    ) -> Result<ResultsEnvelope, ClientError>;

    /// Fetches a resource as bytes. `url` must already be resolved.
    async fn fetch_resource(&self, url: &str, cancel: &CancelToken)
        -> Result<Vec<u8>, ClientError>;

    /// Resolves a backend-relative path against the configured origin.
    fn resolve(&self, path: &str) -> String;
}
