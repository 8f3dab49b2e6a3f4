//! Report rendering for a completed analysis.

mod export;
pub use export::{platform_target, PlatformSave};

mod modal;
pub use modal::ImageModal;

mod report;
pub use report::ReportView;

mod stats;
pub use stats::{BehaviorTable, CleaningSummary, ClusterTable, FunnelTable};

mod tile;
pub use tile::ResourceTile;

mod utils;
