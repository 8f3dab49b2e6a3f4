//! Async drivers for the session lifecycle.
//!
//! Drivers talk to the backend and report what happened as [`FlowUpdate`]s
//! over a channel; only the owning view applies them to its
//! [`SessionMachine`](super::machine::SessionMachine). Everything a driver
//! awaits runs under the view's [`CancelToken`], so tearing the view down
//! stops the progress ticker and turns pending calls into ignorable
//! cancellations.

use std::rc::Rc;

use api::{AnalysisBackend, CancelToken, ClientError, SessionId, UploadFile};
use futures::future::{select, Either};
use futures::pin_mut;
use futures_channel::mpsc::UnboundedSender;
use tracing::debug;

use super::machine::{FlowEvent, FlowUpdate, SessionHandle};
use super::progress::{run_ticker, TICK_INTERVAL};
use crate::core::aggregate::{Hydration, ResultAggregator};

#[derive(Clone)]
pub struct FlowContext {
    pub backend: Rc<dyn AnalysisBackend>,
    pub attempt: u64,
    pub updates: UnboundedSender<FlowUpdate>,
    pub cancel: CancelToken,
}

impl FlowContext {
    fn emit(&self, event: FlowEvent) {
        let update = FlowUpdate {
            attempt: self.attempt,
            event,
        };
        if let Err(err) = self.updates.unbounded_send(update) {
            debug!(
                attempt = self.attempt,
                event = err.into_inner().event.name(),
                "session view gone, update dropped"
            );
        }
    }

    fn failed(&self, err: ClientError, event: fn(String) -> FlowEvent) {
        if err.is_cancelled() {
            debug!(attempt = self.attempt, "backend call cancelled");
        } else {
            self.emit(event(err.user_message()));
        }
    }
}

/// Submit `file`, then run the analysis for the issued session.
pub async fn run_upload(ctx: FlowContext, file: UploadFile) {
    match ctx.backend.submit(file, &ctx.cancel).await {
        Ok(session_id) => {
            ctx.emit(FlowEvent::Uploaded(SessionHandle::issued(session_id.clone())));
            run_analysis(&ctx, session_id).await;
        }
        Err(err) => ctx.failed(err, FlowEvent::UploadFailed),
    }
}

/// Trigger the analysis and tick cosmetic progress until it resolves.
///
/// The ticker and the request are independent; whichever way the request
/// resolves, the ticker is dropped with it.
pub async fn run_analysis(ctx: &FlowContext, session_id: SessionId) {
    ctx.emit(FlowEvent::WaitingStarted);

    let ticker = ctx.cancel.run(run_ticker(TICK_INTERVAL, rand::thread_rng(), |value| {
        ctx.emit(FlowEvent::Progress(value))
    }));
    let analysis = ctx.backend.trigger_analysis(&session_id, &ctx.cancel);
    pin_mut!(ticker, analysis);

    let outcome = match select(ticker, analysis).await {
        // The ticker only finishes once the scope is cancelled.
        Either::Left((_, analysis)) => analysis.await,
        Either::Right((outcome, _ticker)) => outcome,
    };

    match outcome {
        Ok(result) => ctx.emit(FlowEvent::AnalysisSucceeded(result)),
        Err(err) => ctx.failed(err, FlowEvent::AnalysisFailed),
    }
}

/// Load a session reached by direct navigation.
pub async fn run_hydrate(ctx: FlowContext, session_id: SessionId) {
    let aggregator = ResultAggregator::new(ctx.backend.as_ref());
    match aggregator.fetch(&session_id, &ctx.cancel).await {
        Ok(Hydration::Ready(result)) => ctx.emit(FlowEvent::Hydrated(result)),
        Ok(Hydration::Pending) => {
            ctx.emit(FlowEvent::HydratePending(SessionHandle::issued(session_id.clone())));
            run_analysis(&ctx, session_id).await;
        }
        Err(err) => ctx.failed(err, FlowEvent::HydrateFailed),
    }
}
