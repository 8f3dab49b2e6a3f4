use std::time::Duration;

use api::{AnalysisResult, CancelToken, ResourceName, SessionId};
use dioxus::prelude::*;
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::export::platform_target;
use super::modal::ImageModal;
use super::stats::{BehaviorTable, CleaningSummary, ClusterTable, FunnelTable};
use super::tile::ResourceTile;
use super::utils::{format_time_badge, resource_title};
use crate::backend::use_backend;
use crate::core::download::{DownloadError, DownloadManager};
use crate::core::modal::ModalViewer;
use crate::core::resources::ResourceBoard;
use crate::core::timing;
use crate::i18n::use_language;
use crate::t;

/// How long a download notice stays up unless dismissed.
const NOTICE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq)]
enum DownloadStatus {
    Idle,
    Working(ResourceName),
    Done(Option<String>),
    Error(String),
}

fn user_message(err: DownloadError) -> String {
    match err {
        DownloadError::Fetch(message) => message,
        other => t!("download-save-failed", reason = other.to_string()),
    }
}

/// Rendered report for one session: statistics, chart tiles, downloads and
/// the enlarge overlay.
#[component]
pub fn ReportView(
    session_id: SessionId,
    result: AnalysisResult,
    on_start_over: EventHandler<()>,
) -> Element {
    use_language();
    let backend = use_backend();
    let board = use_signal({
        let backend = backend.clone();
        let images = result.image_urls.clone();
        move || {
            let mut board = ResourceBoard::default();
            for (name, url) in images.iter() {
                board.reference(name, &backend.resolve(url));
            }
            board
        }
    });
    let modal = use_signal(ModalViewer::default);
    let mut status = use_signal(|| DownloadStatus::Idle);
    let cancel = use_hook(CancelToken::new);
    let loaded_at = use_hook(|| format_time_badge(OffsetDateTime::now_utc()));

    use_drop({
        let cancel = cancel.clone();
        move || cancel.cancel()
    });

    let on_download = use_callback({
        let images = result.image_urls.clone();
        move |name: ResourceName| {
            if matches!(*status.peek(), DownloadStatus::Working(_)) {
                return;
            }
            let Some(url) = images.get(name).map(str::to_string) else {
                debug!(resource = %name, "nothing to download");
                return;
            };
            status.set(DownloadStatus::Working(name));

            let backend = backend.clone();
            let cancel = cancel.clone();
            spawn(async move {
                let mut status = status;
                let outcome = match platform_target() {
                    Ok(target) => {
                        DownloadManager::new(backend.as_ref(), &target)
                            .download(&url, name.download_name(), &cancel)
                            .await
                    }
                    Err(err) => Err(err),
                };
                let shown = match outcome {
                    Ok(saved) => DownloadStatus::Done(saved),
                    Err(DownloadError::Cancelled) => return,
                    Err(err) => {
                        warn!(resource = %name, error = %err, "download failed");
                        DownloadStatus::Error(user_message(err))
                    }
                };
                status.set(shown.clone());

                timing::sleep(NOTICE_TIMEOUT).await;
                if *status.peek() == shown {
                    status.set(DownloadStatus::Idle);
                }
            });
        }
    });

    let downloading = matches!(status(), DownloadStatus::Working(_));
    let notice = match status() {
        DownloadStatus::Idle => None,
        DownloadStatus::Working(name) => Some((
            "report__notice",
            t!("download-working", resource = resource_title(name)),
        )),
        DownloadStatus::Done(Some(path)) => Some((
            "report__notice report__notice--success",
            t!("download-saved-to", path = path),
        )),
        DownloadStatus::Done(None) => Some((
            "report__notice report__notice--success",
            t!("download-started"),
        )),
        DownloadStatus::Error(message) => {
            Some(("report__notice report__notice--error", message))
        }
    };

    let images = result.image_urls.clone();
    let present = ResourceName::ALL
        .into_iter()
        .filter(|name| images.contains(*name))
        .collect::<Vec<_>>();
    let cleaning = result.cleaning_stats;
    let kmeans = result.kmeans_results.clone();
    let heatmap = result.heatmap_results.clone();
    let funnel = result.funnel_results.clone();
    let show_kmeans = kmeans.is_some()
        || images.contains(ResourceName::KmeansElbow)
        || images.contains(ResourceName::KmeansClusters);
    let show_heatmap = heatmap.is_some() || images.contains(ResourceName::Heatmap);
    let show_funnel = funnel.is_some() || images.contains(ResourceName::Funnel);

    rsx! {
        section { class: "page report",
            header { class: "report__header",
                div {
                    h1 { {t!("report-title")} }
                    p { class: "report__meta",
                        {t!("report-meta", session = session_id.to_string(), time = loaded_at.clone())}
                    }
                }
                div { class: "report__toolbar",
                    for name in present {
                        button {
                            key: "{name}",
                            r#type: "button",
                            class: "button button--ghost",
                            disabled: downloading,
                            onclick: move |_| on_download.call(name),
                            {t!("download-resource", resource = resource_title(name))}
                        }
                    }
                    button {
                        r#type: "button",
                        class: "button button--primary",
                        onclick: move |_| on_start_over.call(()),
                        {t!("report-start-over")}
                    }
                }
            }

            if let Some((class_name, message)) = notice {
                div { class: "{class_name}", role: "status",
                    span { "{message}" }
                    if !downloading {
                        button {
                            r#type: "button",
                            class: "report__notice-dismiss",
                            aria_label: t!("download-dismiss"),
                            onclick: move |_| status.set(DownloadStatus::Idle),
                            "×"
                        }
                    }
                }
            }

            if !result.has_statistics() {
                p { class: "report__partial", {t!("report-statistics-unavailable")} }
            }

            if let Some(stats) = cleaning {
                CleaningSummary { stats }
            }

            if show_kmeans {
                section { class: "report-section",
                    h2 { {t!("report-kmeans-title")} }
                    div { class: "report-grid",
                        ResourceTile { name: ResourceName::KmeansElbow, board, modal, on_download, downloading }
                        ResourceTile { name: ResourceName::KmeansClusters, board, modal, on_download, downloading }
                    }
                    if let Some(kmeans) = kmeans {
                        ClusterTable { kmeans }
                    }
                }
            }

            if show_heatmap {
                section { class: "report-section",
                    h2 { {t!("report-heatmap-title")} }
                    ResourceTile { name: ResourceName::Heatmap, board, modal, on_download, downloading }
                    if let Some(heatmap) = heatmap {
                        BehaviorTable { heatmap }
                    }
                }
            }

            if show_funnel {
                section { class: "report-section",
                    h2 { {t!("report-funnel-title")} }
                    ResourceTile { name: ResourceName::Funnel, board, modal, on_download, downloading }
                    if let Some(funnel) = funnel {
                        FunnelTable { funnel }
                    }
                }
            }

            ImageModal { modal }
        }
    }
}
