//! Session lifecycle: transition engine, async drivers and the hosting view.

pub mod flow;
pub mod machine;
pub mod progress;

mod view;
pub use view::{is_csv_name, SessionEntry, SessionView};
