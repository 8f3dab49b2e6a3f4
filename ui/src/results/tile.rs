use api::ResourceName;
use dioxus::prelude::*;
use tracing::{debug, warn};

use super::utils::resource_title;
use crate::core::modal::ModalViewer;
use crate::core::resources::{ResourceBoard, ResourceLoadState};
use crate::i18n::use_language;
use crate::t;

/// One chart image with its own load state. Renders nothing for images the
/// report never referenced.
#[component]
pub fn ResourceTile(
    name: ResourceName,
    board: Signal<ResourceBoard>,
    modal: Signal<ModalViewer>,
    on_download: EventHandler<ResourceName>,
    downloading: bool,
) -> Element {
    use_language();
    let mut board = board;
    let mut modal = modal;
    let title = resource_title(name);
    let state = board.read().state(name).clone();
    let loading = state.is_loading();

    let frame = match state {
        ResourceLoadState::Idle => return rsx! {},
        ResourceLoadState::Loading { url, attempt } | ResourceLoadState::Loaded { url, attempt } => {
            let image_class = if loading {
                "resource-tile__image resource-tile__image--loading"
            } else {
                "resource-tile__image"
            };
            let enlarge = {
                let url = url.clone();
                let title = title.clone();
                move |_: MouseEvent| modal.write().open(url.clone(), title.clone())
            };
            rsx! {
                div { class: "resource-tile__frame",
                    if loading {
                        div { class: "spinner resource-tile__spinner", aria_hidden: "true" }
                    }
                    img {
                        class: "{image_class}",
                        src: "{url}",
                        alt: "{title}",
                        title: t!("resource-enlarge-hint"),
                        onload: move |_| {
                            if !board.write().mark_loaded(name, attempt) {
                                debug!(resource = %name, attempt, "stale load signal");
                            }
                        },
                        onerror: move |_| {
                            if let Some(err) = board.write().mark_errored(name, attempt) {
                                warn!(error = %err, "chart image failed");
                            }
                        },
                        onclick: enlarge,
                    }
                }
            }
        }
        ResourceLoadState::Errored { error, .. } => rsx! {
            div { class: "resource-tile__frame resource-tile__frame--error", role: "alert",
                p { class: "resource-tile__error", {t!("resource-load-failed")} }
                p { class: "resource-tile__url", "{error.url}" }
                button {
                    r#type: "button",
                    class: "button",
                    onclick: move |_| {
                        board.write().retry(name);
                    },
                    {t!("resource-retry")}
                }
            }
        },
    };

    rsx! {
        figure { class: "resource-tile",
            figcaption { class: "resource-tile__header",
                h3 { "{title}" }
                button {
                    r#type: "button",
                    class: "button button--ghost resource-tile__download",
                    disabled: downloading,
                    onclick: move |_| on_download.call(name),
                    {t!("download-button")}
                }
            }
            {frame}
        }
    }
}
