use api::ResourceName;
use time::{macros::format_description, OffsetDateTime};

use crate::t;

pub(crate) fn resource_title(name: ResourceName) -> String {
    match name {
        ResourceName::KmeansElbow => t!("resource-kmeans-elbow"),
        ResourceName::KmeansClusters => t!("resource-kmeans-clusters"),
        ResourceName::Heatmap => t!("resource-heatmap"),
        ResourceName::Funnel => t!("resource-funnel"),
    }
}

/// One-based label shown for a zero-based cluster index.
pub(crate) fn cluster_label(cluster: u32) -> String {
    t!("stats-cluster-label", number = cluster.saturating_add(1).to_string())
}

pub(crate) fn format_time_badge(date: OffsetDateTime) -> String {
    date.format(&format_description!("[hour]:[minute]"))
        .unwrap_or_else(|_| "-".to_string())
}
