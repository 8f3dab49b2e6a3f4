//! Scripted in-memory backend for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

use api::{
    AnalysisBackend, AnalysisResult, CancelToken, CleaningStats, ClientError, ImageUrls,
    ResourceName, ResultStatus, ResultsEnvelope, SessionId, UploadFile,
};
use async_trait::async_trait;

use crate::core::timing;

pub(crate) const ORIGIN: &str = "http://backend.test";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Submit(String),
    Trigger(SessionId),
    Fetch(SessionId),
    Resource(String),
}

type Script<T> = RefCell<VecDeque<Result<T, ClientError>>>;

#[derive(Default)]
pub(crate) struct FakeBackend {
    calls: RefCell<Vec<Call>>,
    submits: Script<SessionId>,
    triggers: Script<AnalysisResult>,
    fetches: Script<ResultsEnvelope>,
    resources: Script<Vec<u8>>,
    trigger_delay: Cell<Duration>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_submit(self, outcome: Result<SessionId, ClientError>) -> Self {
        self.submits.borrow_mut().push_back(outcome);
        self
    }

    pub fn on_trigger(self, outcome: Result<AnalysisResult, ClientError>) -> Self {
        self.triggers.borrow_mut().push_back(outcome);
        self
    }

    pub fn on_fetch(self, outcome: Result<ResultsEnvelope, ClientError>) -> Self {
        self.fetches.borrow_mut().push_back(outcome);
        self
    }

    pub fn on_resource(self, outcome: Result<Vec<u8>, ClientError>) -> Self {
        self.resources.borrow_mut().push_back(outcome);
        self
    }

    /// Simulated analysis duration, measured on the runtime clock.
    pub fn with_trigger_delay(self, delay: Duration) -> Self {
        self.trigger_delay.set(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

fn next<T>(script: &Script<T>, what: &str) -> Result<T, ClientError> {
    script
        .borrow_mut()
        .pop_front()
        .unwrap_or_else(|| panic!("unexpected {what} call"))
}

#[async_trait(?Send)]
impl AnalysisBackend for FakeBackend {
    async fn submit(
        &self,
        file: UploadFile,
        cancel: &CancelToken,
    ) -> Result<SessionId, ClientError> {
        self.record(Call::Submit(file.name));
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        next(&self.submits, "submit")
    }

    async fn trigger_analysis(
        &self,
        session_id: &SessionId,
        cancel: &CancelToken,
    ) -> Result<AnalysisResult, ClientError> {
        self.record(Call::Trigger(session_id.clone()));
        let delay = self.trigger_delay.get();
        if !delay.is_zero() {
            cancel
                .run(timing::sleep(delay))
                .await
                .map_err(|_| ClientError::Cancelled)?;
        }
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        next(&self.triggers, "trigger_analysis")
    }

    async fn fetch_results(
        &self,
        session_id: &SessionId,
        cancel: &CancelToken,
    ) -> Result<ResultsEnvelope, ClientError> {
        self.record(Call::Fetch(session_id.clone()));
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        next(&self.fetches, "fetch_results")
    }

    async fn fetch_resource(
        &self,
        url: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, ClientError> {
        self.record(Call::Resource(url.to_string()));
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        next(&self.resources, "fetch_resource")
    }

    fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{ORIGIN}/{}", path.trim_start_matches('/'))
        }
    }
}

pub(crate) fn images(entries: &[(ResourceName, &str)]) -> ImageUrls {
    let mut urls = ImageUrls::default();
    for (name, url) in entries {
        urls.insert(*name, *url);
    }
    urls
}

/// Payload with image references only.
pub(crate) fn partial_result(session: &str) -> AnalysisResult {
    AnalysisResult {
        session_id: Some(SessionId::new(session)),
        image_urls: images(&[
            (ResourceName::KmeansClusters, "/static/abc123/kmeans_clusters.png"),
            (ResourceName::Heatmap, "/static/abc123/user_behavior_heatmap.png"),
        ]),
        ..AnalysisResult::default()
    }
}

/// The example report: cleaning stats plus the cluster chart.
pub(crate) fn complete_result(session: &str) -> AnalysisResult {
    AnalysisResult {
        session_id: Some(SessionId::new(session)),
        cleaning_stats: Some(CleaningStats {
            original_rows: 1000,
            cleaned_rows: 950,
            removed_rows: 50,
            percent_kept: 95.0,
        }),
        image_urls: images(&[(ResourceName::KmeansClusters, "/images/abc123/clusters.png")]),
        ..AnalysisResult::default()
    }
}

pub(crate) fn envelope(status: ResultStatus, payload: AnalysisResult) -> ResultsEnvelope {
    ResultsEnvelope {
        status,
        message: None,
        payload,
    }
}
