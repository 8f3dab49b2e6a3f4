//! Completes partial results payloads.
//!
//! `GET /results` may answer with image references only. The aggregator
//! detects that case and asks the backend once more for the full report.
//! When that second call fails the images are still worth showing, so the
//! partial payload is returned as-is instead of an error.

use api::{
    AnalysisBackend, AnalysisResult, CancelToken, ClientError, ResultStatus, SessionId,
};
use tracing::{debug, info, warn};

/// Outcome of hydrating a session straight from `GET /results`.
#[derive(Debug, Clone, PartialEq)]
pub enum Hydration {
    /// Ready for display. May still be image-only when completion failed.
    Ready(AnalysisResult),
    /// The backend has not finished computing this session.
    Pending,
}

pub struct ResultAggregator<'a> {
    backend: &'a dyn AnalysisBackend,
}

impl<'a> ResultAggregator<'a> {
    pub fn new(backend: &'a dyn AnalysisBackend) -> Self {
        Self { backend }
    }

    /// Fetches stored results for `session_id`, completing partial payloads.
    /// An `error` envelope surfaces the server's message verbatim.
    pub async fn fetch(
        &self,
        session_id: &SessionId,
        cancel: &CancelToken,
    ) -> Result<Hydration, ClientError> {
        let envelope = self.backend.fetch_results(session_id, cancel).await?;
        match envelope.status {
            ResultStatus::Success => {
                let result = self.complete(session_id, envelope.payload, cancel).await;
                Ok(Hydration::Ready(result))
            }
            ResultStatus::Pending => {
                debug!(%session_id, message = ?envelope.message, "results pending");
                Ok(Hydration::Pending)
            }
            ResultStatus::Error => Err(envelope
                .message
                .map(ClientError::FetchResults)
                .unwrap_or_else(ClientError::results_unavailable)),
        }
    }

    /// Returns `fetched` untouched unless it is partial, in which case exactly
    /// one supplemental `trigger_analysis` is issued and merged in.
    pub async fn complete(
        &self,
        session_id: &SessionId,
        fetched: AnalysisResult,
        cancel: &CancelToken,
    ) -> AnalysisResult {
        if !fetched.is_partial() {
            return fetched;
        }

        info!(%session_id, images = fetched.image_urls.len(), "completing partial results");
        match self.backend.trigger_analysis(session_id, cancel).await {
            Ok(supplemental) => merge(fetched, supplemental),
            Err(err) => {
                warn!(%session_id, error = %err, "statistics unavailable, showing images only");
                fetched
            }
        }
    }
}

/// Statistics come from `supplemental`; images from both, `supplemental` first.
fn merge(partial: AnalysisResult, mut supplemental: AnalysisResult) -> AnalysisResult {
    supplemental.image_urls.fill_from(partial.image_urls);
    if supplemental.session_id.is_none() {
        supplemental.session_id = partial.session_id;
    }
    supplemental
}
