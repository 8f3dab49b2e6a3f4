//! HTTP boundary for the Marketlens analysis backend.
//!
//! Everything above this crate talks to the backend through the
//! [`AnalysisBackend`] trait; [`SessionClient`] is the real implementation.

mod backend;
mod cancel;
mod client;
mod config;
mod error;
mod models;

pub use backend::AnalysisBackend;
pub use cancel::CancelToken;
pub use client::{SessionClient, UploadFile};
pub use config::BackendConfig;
pub use error::ClientError;
pub use models::{
    AnalysisResult, BehaviorSummary, CleaningStats, ClusterSize, FunnelResults, FunnelStage,
    HeatmapResults, ImageUrls, KmeansResults, ResourceName, ResultStatus, ResultsEnvelope,
    SessionId,
};
