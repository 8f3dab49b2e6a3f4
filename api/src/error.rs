//! Error taxonomy for backend calls.
//!
//! Each carrying variant holds the message meant for the user: the server's
//! `detail` when the error body has one, else a generic message for the call.

use thiserror::Error;

pub(crate) const UPLOAD_FAILED: &str = "文件上传失败，请重试";
pub(crate) const UPLOAD_MISSING_SESSION: &str = "上传失败，未获取会话ID";
pub(crate) const ANALYSIS_FAILED: &str = "分析过程出错，请重试";
pub(crate) const FETCH_RESULTS_FAILED: &str = "获取分析结果失败，请重试";
pub(crate) const DOWNLOAD_FAILED: &str = "下载图片失败，请重试";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("{0}")]
    Upload(String),
    #[error("{0}")]
    Analysis(String),
    #[error("{0}")]
    FetchResults(String),
    #[error("{0}")]
    Download(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Results failure for an error envelope that carried no message.
    pub fn results_unavailable() -> Self {
        Self::FetchResults(FETCH_RESULTS_FAILED.to_string())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Message suitable for showing to the user verbatim.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
