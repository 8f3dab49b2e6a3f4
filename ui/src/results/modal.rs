use dioxus::prelude::*;
use tracing::debug;

use crate::core::modal::ModalViewer;
use crate::i18n::use_language;
use crate::t;

/// Enlarged chart overlay. A click on the backdrop or Escape closes it; clicks
/// inside the dialog do not. The backdrop takes focus on mount so key events
/// reach it.
#[component]
pub fn ImageModal(modal: Signal<ModalViewer>) -> Element {
    use_language();
    let mut modal = modal;
    let Some(current) = modal.read().current().cloned() else {
        return rsx! {};
    };

    rsx! {
        div {
            class: "modal-backdrop",
            role: "dialog",
            aria_modal: "true",
            aria_label: "{current.label}",
            tabindex: "-1",
            onmounted: move |evt: MountedEvent| async move {
                if let Err(err) = evt.set_focus(true).await {
                    debug!(error = ?err, "modal could not take focus");
                }
            },
            onclick: move |_| modal.write().close(),
            onkeydown: move |evt: KeyboardEvent| {
                if modal.write().close_on_key(&evt.key().to_string()) {
                    evt.prevent_default();
                }
            },
            div { class: "modal", onclick: move |evt| evt.stop_propagation(),
                header { class: "modal__header",
                    h2 { "{current.label}" }
                    button {
                        r#type: "button",
                        class: "button button--ghost modal__close",
                        aria_label: t!("modal-close"),
                        onclick: move |_| modal.write().close(),
                        "×"
                    }
                }
                img { class: "modal__image", src: "{current.url}", alt: "{current.label}" }
            }
        }
    }
}
