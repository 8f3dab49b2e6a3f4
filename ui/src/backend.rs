//! Backend handle shared through the component tree.

use std::rc::Rc;

use api::{AnalysisBackend, BackendConfig, SessionClient};
use dioxus::prelude::*;
use tracing::{info, warn};

/// Builds the HTTP client for the configured origin. A malformed override
/// falls back to the default origin.
pub fn connect() -> Rc<dyn AnalysisBackend> {
    let config = BackendConfig::from_env().unwrap_or_else(|err| {
        warn!(error = %err, "ignoring backend origin override");
        BackendConfig::default()
    });
    info!(origin = %config.origin(), "analysis backend configured");
    Rc::new(SessionClient::new(config))
}

/// Makes `backend` available to every component below the caller.
pub fn provide_backend(backend: Rc<dyn AnalysisBackend>) -> Rc<dyn AnalysisBackend> {
    use_context_provider(move || backend)
}

pub fn use_backend() -> Rc<dyn AnalysisBackend> {
    use_context::<Rc<dyn AnalysisBackend>>()
}
