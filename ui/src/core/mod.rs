//! Platform-neutral pieces shared by the session flow and the report views.

pub mod aggregate;
pub mod download;
pub mod format;
pub mod modal;
pub mod resources;
pub mod timing;
