//! Per-image load tracking for report resources.
//!
//! Every chart image gets its own [`ResourceLoadState`], created the first
//! time the report references it. Entries never influence each other: a
//! failing heatmap leaves the cluster chart alone, and retrying one image only
//! resets that image.

use std::collections::BTreeMap;

use api::ResourceName;
use thiserror::Error;
use tracing::{debug, warn};

/// One image failed to load or decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("resource `{resource}` failed to load from {url}")]
pub struct ResourceLoadError {
    pub resource: ResourceName,
    pub url: String,
}

/// Load state of a single image. `attempt` counts user retries and tags the
/// image element so signals from an older attempt can be told apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResourceLoadState {
    #[default]
    Idle,
    Loading {
        url: String,
        attempt: u32,
    },
    Loaded {
        url: String,
        attempt: u32,
    },
    Errored {
        attempt: u32,
        error: ResourceLoadError,
    },
}

impl ResourceLoadState {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Loading { url, .. } | Self::Loaded { url, .. } => Some(url),
            Self::Errored { error, .. } => Some(&error.url),
        }
    }

    pub fn attempt(&self) -> u32 {
        match self {
            Self::Idle => 0,
            Self::Loading { attempt, .. }
            | Self::Loaded { attempt, .. }
            | Self::Errored { attempt, .. } => *attempt,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

static IDLE: ResourceLoadState = ResourceLoadState::Idle;

/// Load states for every image one report references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceBoard {
    entries: BTreeMap<ResourceName, ResourceLoadState>,
}

impl ResourceBoard {
    pub fn state(&self, name: ResourceName) -> &ResourceLoadState {
        self.entries.get(&name).unwrap_or(&IDLE)
    }

    /// First reference moves the resource from `Idle` to `Loading`; repeat
    /// references leave the current state untouched.
    pub fn reference(&mut self, name: ResourceName, url: &str) -> &ResourceLoadState {
        self.entries.entry(name).or_insert_with(|| {
            debug!(resource = %name, %url, "loading resource");
            ResourceLoadState::Loading {
                url: url.to_string(),
                attempt: 0,
            }
        })
    }

    /// Records a decode success reported by the rendering surface.
    /// Returns `false` when the signal belongs to another attempt or state.
    pub fn mark_loaded(&mut self, name: ResourceName, attempt: u32) -> bool {
        let Some(entry) = self.entries.get_mut(&name) else {
            return false;
        };
        match entry {
            ResourceLoadState::Loading { url, attempt: current } if *current == attempt => {
                *entry = ResourceLoadState::Loaded {
                    url: std::mem::take(url),
                    attempt,
                };
                true
            }
            _ => false,
        }
    }

    /// Records a fetch or decode failure, keeping the failing URL.
    pub fn mark_errored(&mut self, name: ResourceName, attempt: u32) -> Option<ResourceLoadError> {
        let entry = self.entries.get_mut(&name)?;
        match entry {
            ResourceLoadState::Loading { url, attempt: current } if *current == attempt => {
                let error = ResourceLoadError {
                    resource: name,
                    url: std::mem::take(url),
                };
                warn!(resource = %name, url = %error.url, attempt, "resource failed to load");
                *entry = ResourceLoadState::Errored {
                    attempt,
                    error: error.clone(),
                };
                Some(error)
            }
            _ => None,
        }
    }

    /// User retry: `Errored` goes back to `Loading` under a new attempt.
    /// Any other state, and every other resource, is left alone.
    pub fn retry(&mut self, name: ResourceName) -> bool {
        let Some(entry) = self.entries.get_mut(&name) else {
            return false;
        };
        match entry {
            ResourceLoadState::Errored { attempt, error } => {
                let next = *attempt + 1;
                debug!(resource = %name, attempt = next, "retrying resource");
                *entry = ResourceLoadState::Loading {
                    url: std::mem::take(&mut error.url),
                    attempt: next,
                };
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
