//! Job lifecycle of one analysis session.
//!
//! The machine is a plain transition engine: user actions call the `begin_*`
//! and `restart` methods, the async drivers in [`super::flow`] report
//! progress as [`FlowUpdate`]s, and nothing else mutates the state.
//! Updates carry the attempt they were started under, so results that
//! arrive after a restart or after the view is gone are rejected instead of
//! applied.

use api::{AnalysisResult, SessionId};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info};

use super::progress::PROGRESS_CEILING;

/// Client-side reference to a server session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionHandle {
    pub id: SessionId,
    /// When this client learned about the session.
    pub created_at: OffsetDateTime,
}

impl SessionHandle {
    pub fn issued(id: SessionId) -> Self {
        Self {
            id,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionJobState {
    #[default]
    Idle,
    Uploading {
        file_name: String,
    },
    TriggeringAnalysis {
        session: SessionHandle,
    },
    /// `progress` is cosmetic, in `0..PROGRESS_CEILING`.
    Waiting {
        session: SessionHandle,
        progress: f64,
    },
    Hydrating {
        session_id: SessionId,
    },
    Ready {
        session_id: SessionId,
        result: AnalysisResult,
    },
    Failed {
        reason: String,
    },
}

impl SessionJobState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Uploading { .. } => "uploading",
            Self::TriggeringAnalysis { .. } => "triggering-analysis",
            Self::Waiting { .. } => "waiting",
            Self::Hydrating { .. } => "hydrating",
            Self::Ready { .. } => "ready",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::TriggeringAnalysis { session } | Self::Waiting { session, .. } => {
                Some(&session.id)
            }
            Self::Hydrating { session_id } | Self::Ready { session_id, .. } => Some(session_id),
            Self::Idle | Self::Uploading { .. } | Self::Failed { .. } => None,
        }
    }
}

/// What a flow driver observed.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    Uploaded(SessionHandle),
    UploadFailed(String),
    WaitingStarted,
    Progress(f64),
    AnalysisSucceeded(AnalysisResult),
    AnalysisFailed(String),
    /// Direct navigation found the session still computing.
    HydratePending(SessionHandle),
    Hydrated(AnalysisResult),
    HydrateFailed(String),
}

impl FlowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uploaded(_) => "uploaded",
            Self::UploadFailed(_) => "upload-failed",
            Self::WaitingStarted => "waiting-started",
            Self::Progress(_) => "progress",
            Self::AnalysisSucceeded(_) => "analysis-succeeded",
            Self::AnalysisFailed(_) => "analysis-failed",
            Self::HydratePending(_) => "hydrate-pending",
            Self::Hydrated(_) => "hydrated",
            Self::HydrateFailed(_) => "hydrate-failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowUpdate {
    pub attempt: u64,
    pub event: FlowEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransition {
    #[error("update from attempt {update} ignored; current attempt is {current}")]
    Stale { update: u64, current: u64 },
    #[error("session view already torn down")]
    TornDown,
    #[error("`{action}` does not apply in state `{state}`")]
    NotApplicable {
        state: &'static str,
        action: &'static str,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionMachine {
    state: SessionJobState,
    attempt: u64,
    torn_down: bool,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionJobState {
        &self.state
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn progress(&self) -> Option<f64> {
        match self.state {
            SessionJobState::Waiting { progress, .. } => Some(progress),
            _ => None,
        }
    }

    /// `Idle → Uploading`. Returns the attempt the upload runs under.
    pub fn begin_upload(&mut self, file_name: impl Into<String>) -> Result<u64, InvalidTransition> {
        self.start(
            "begin-upload",
            SessionJobState::Uploading {
                file_name: file_name.into(),
            },
        )
    }

    /// `Idle → Hydrating`, for a results view reached without uploading.
    pub fn begin_hydrate(&mut self, session_id: SessionId) -> Result<u64, InvalidTransition> {
        self.start("begin-hydrate", SessionJobState::Hydrating { session_id })
    }

    /// `Failed → Idle`. Anything still in flight from the failed attempt is
    /// ignored from here on.
    pub fn restart(&mut self) -> Result<(), InvalidTransition> {
        self.check_live()?;
        if !matches!(self.state, SessionJobState::Failed { .. }) {
            return Err(self.not_applicable("restart"));
        }
        self.attempt += 1;
        self.transition(SessionJobState::Idle);
        Ok(())
    }

    /// A fresh `Idle` machine for starting over from any state. Updates from
    /// this machine's attempts are stale for the successor.
    pub fn successor(&self) -> SessionMachine {
        SessionMachine {
            state: SessionJobState::Idle,
            attempt: self.attempt + 1,
            torn_down: false,
        }
    }

    /// Stops accepting updates. Idempotent.
    pub fn teardown(&mut self) {
        if !self.torn_down {
            debug!(state = self.state.name(), attempt = self.attempt, "session torn down");
            self.torn_down = true;
        }
    }

    pub fn apply(&mut self, update: FlowUpdate) -> Result<(), InvalidTransition> {
        self.check_live()?;
        if update.attempt != self.attempt {
            return Err(InvalidTransition::Stale {
                update: update.attempt,
                current: self.attempt,
            });
        }

        let action = update.event.name();
        let state = std::mem::take(&mut self.state);
        let next = match (state, update.event) {
            (SessionJobState::Uploading { .. }, FlowEvent::Uploaded(session)) => {
                SessionJobState::TriggeringAnalysis { session }
            }
            (SessionJobState::Uploading { .. }, FlowEvent::UploadFailed(reason)) => {
                SessionJobState::Failed { reason }
            }
            (SessionJobState::TriggeringAnalysis { session }, FlowEvent::WaitingStarted) => {
                SessionJobState::Waiting {
                    session,
                    progress: 0.0,
                }
            }
            (SessionJobState::Waiting { session, progress }, FlowEvent::Progress(value)) => {
                // Never moves backwards; stops at the ceiling.
                self.state = SessionJobState::Waiting {
                    session,
                    progress: value.min(PROGRESS_CEILING).max(progress),
                };
                return Ok(());
            }
            (
                SessionJobState::TriggeringAnalysis { session }
                | SessionJobState::Waiting { session, .. },
                FlowEvent::AnalysisSucceeded(result),
            ) => SessionJobState::Ready {
                session_id: session.id,
                result,
            },
            (
                SessionJobState::TriggeringAnalysis { .. } | SessionJobState::Waiting { .. },
                FlowEvent::AnalysisFailed(reason),
            ) => SessionJobState::Failed { reason },
            (SessionJobState::Hydrating { .. }, FlowEvent::HydratePending(session)) => {
                SessionJobState::TriggeringAnalysis { session }
            }
            (SessionJobState::Hydrating { session_id }, FlowEvent::Hydrated(result)) => {
                SessionJobState::Ready { session_id, result }
            }
            (SessionJobState::Hydrating { .. }, FlowEvent::HydrateFailed(reason)) => {
                SessionJobState::Failed { reason }
            }
            (state, _) => {
                self.state = state;
                return Err(self.not_applicable(action));
            }
        };
        self.transition(next);
        Ok(())
    }

    fn start(
        &mut self,
        action: &'static str,
        next: SessionJobState,
    ) -> Result<u64, InvalidTransition> {
        self.check_live()?;
        if !matches!(self.state, SessionJobState::Idle) {
            return Err(self.not_applicable(action));
        }
        self.attempt += 1;
        self.transition(next);
        Ok(self.attempt)
    }

    fn transition(&mut self, next: SessionJobState) {
        info!(
            from = self.state.name(),
            to = next.name(),
            attempt = self.attempt,
            "session transition"
        );
        self.state = next;
    }

    fn check_live(&self) -> Result<(), InvalidTransition> {
        if self.torn_down {
            Err(InvalidTransition::TornDown)
        } else {
            Ok(())
        }
    }

    fn not_applicable(&self, action: &'static str) -> InvalidTransition {
        InvalidTransition::NotApplicable {
            state: self.state.name(),
            action,
        }
    }
}
