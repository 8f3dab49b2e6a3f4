use dioxus::prelude::*;

use crate::session::{SessionEntry, SessionView};

/// Direct link to a session's results. Keyed by id so a new id gets a fresh
/// session.
#[component]
pub fn Results(session_id: String) -> Element {
    rsx! {
        section { class: "page page-results",
            SessionView { key: "{session_id}", entry: SessionEntry::Existing(session_id.clone()) }
        }
    }
}
