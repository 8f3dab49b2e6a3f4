use api::{CleaningStats, FunnelResults, HeatmapResults, KmeansResults};
use dioxus::prelude::*;

use super::utils::cluster_label;
use crate::core::format;
use crate::i18n::use_language;
use crate::t;

#[component]
pub fn CleaningSummary(stats: CleaningStats) -> Element {
    use_language();
    let cards = [
        (t!("stats-original-rows"), format::format_count(stats.original_rows)),
        (t!("stats-cleaned-rows"), format::format_count(stats.cleaned_rows)),
        (t!("stats-removed-rows"), format::format_count(stats.removed_rows)),
        (t!("stats-percent-kept"), format::format_percent_kept(stats.percent_kept)),
    ];

    rsx! {
        section { class: "report-section",
            h2 { {t!("report-cleaning-title")} }
            div { class: "stat-cards",
                for (idx, (label, value)) in cards.into_iter().enumerate() {
                    div { key: "{idx}", class: "stat-card",
                        span { class: "stat-card__label", "{label}" }
                        strong { class: "stat-card__value", "{value}" }
                    }
                }
            }
        }
    }
}

#[component]
pub fn ClusterTable(kmeans: KmeansResults) -> Element {
    use_language();
    let rows = kmeans
        .cluster_stats
        .iter()
        .map(|size| {
            let share = kmeans
                .share_percent(size)
                .map(format::format_percent)
                .unwrap_or_else(|| "-".to_string());
            (
                size.cluster,
                cluster_label(size.cluster),
                format::format_count(size.users),
                share,
            )
        })
        .collect::<Vec<_>>();

    if rows.is_empty() {
        return rsx! {};
    }

    rsx! {
        div { class: "stats-table",
            h3 { {t!("stats-clusters-title")} }
            table {
                thead {
                    tr {
                        th { {t!("stats-cluster")} }
                        th { {t!("stats-users")} }
                        th { {t!("stats-share")} }
                    }
                }
                tbody {
                    for (cluster, label, users, share) in rows {
                        tr { key: "{cluster}",
                            td { "{label}" }
                            td { class: "stats-table__number", "{users}" }
                            td { class: "stats-table__number", "{share}" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn BehaviorTable(heatmap: HeatmapResults) -> Element {
    use_language();
    if heatmap.top_behaviors.is_empty() {
        return rsx! {};
    }

    rsx! {
        div { class: "stats-table",
            h3 { {t!("stats-behaviors-title")} }
            table {
                thead {
                    tr {
                        th { {t!("stats-behavior")} }
                        th { {t!("stats-mean")} }
                        th { {t!("stats-max")} }
                    }
                }
                tbody {
                    for behavior in heatmap.top_behaviors.iter() {
                        tr { key: "{behavior.name}",
                            td { "{behavior.name}" }
                            td { class: "stats-table__number", {format::format_mean(behavior.mean)} }
                            td { class: "stats-table__number", {format::format_max(behavior.max)} }
                        }
                    }
                }
            }
        }
    }
}

/// Conversion rates arrive preformatted and are shown verbatim.
#[component]
pub fn FunnelTable(funnel: FunnelResults) -> Element {
    use_language();
    if funnel.funnel_data.is_empty() {
        return rsx! {};
    }

    rsx! {
        div { class: "stats-table",
            h3 { {t!("stats-funnel-title")} }
            table {
                thead {
                    tr {
                        th { {t!("stats-stage")} }
                        th { {t!("stats-stage-users")} }
                        th { {t!("stats-conversion")} }
                    }
                }
                tbody {
                    for (idx, stage) in funnel.funnel_data.iter().enumerate() {
                        tr { key: "{idx}",
                            td { "{stage.stage}" }
                            td { class: "stats-table__number", {format::format_count(stage.count)} }
                            td { class: "stats-table__number", "{stage.conversion_rate}" }
                        }
                    }
                }
            }
        }
    }
}
