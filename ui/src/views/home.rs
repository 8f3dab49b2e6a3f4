use dioxus::prelude::*;

use crate::session::{SessionEntry, SessionView};
use crate::i18n::use_language;
use crate::t;

#[component]
pub fn Home() -> Element {
    use_language();

    rsx! {
        section { class: "page page-home",
            header { class: "page-home__hero",
                h1 { {t!("home-title")} }
                p { {t!("home-lead")} }
            }
            SessionView { entry: SessionEntry::Upload }
        }
    }
}
