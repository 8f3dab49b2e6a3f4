use api::{CancelToken, SessionId, UploadFile};
use dioxus::prelude::*;
use futures_util::StreamExt;
use tracing::{debug, warn};

use super::flow::{run_hydrate, run_upload, FlowContext};
use super::machine::{FlowUpdate, SessionJobState, SessionMachine};
use super::progress::steps_completed;
use crate::backend::use_backend;
use crate::core::format;
use crate::results::ReportView;
use crate::i18n::use_language;
use crate::t;

/// How the view was reached.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEntry {
    /// Fresh start: show the upload form.
    Upload,
    /// Direct navigation to a known session id.
    Existing(String),
}

/// Presentation-layer CSV check, by extension only.
pub fn is_csv_name(name: &str) -> bool {
    name.trim().to_ascii_lowercase().ends_with(".csv")
}

/// Last path component of a picked file (desktop pickers hand out full paths).
fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Hosts one session: owns its [`SessionMachine`], starts the flow drivers
/// and applies their updates. Unmounting cancels everything in flight.
#[component]
pub fn SessionView(entry: SessionEntry) -> Element {
    use_language();
    let backend = use_backend();
    let mut machine = use_signal(SessionMachine::new);
    let cancel = use_hook(CancelToken::new);

    let updates = use_coroutine(move |mut rx: UnboundedReceiver<FlowUpdate>| {
        let mut machine = machine;
        async move {
            while let Some(update) = rx.next().await {
                match machine.try_write().map(|mut machine| machine.apply(update)) {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => debug!(error = %err, "flow update ignored"),
                    Err(_) => debug!("session state gone, flow update dropped"),
                }
            }
        }
    });

    let flow = {
        let cancel = cancel.clone();
        move |attempt: u64| FlowContext {
            backend: backend.clone(),
            attempt,
            updates: updates.tx(),
            cancel: cancel.clone(),
        }
    };

    use_hook(|| {
        if let SessionEntry::Existing(raw) = entry.clone() {
            let flow = flow.clone();
            spawn(async move {
                let mut machine = machine;
                let session_id = SessionId::new(raw);
                let started = machine.write().begin_hydrate(session_id.clone());
                match started {
                    Ok(attempt) => run_hydrate(flow(attempt), session_id).await,
                    Err(err) => warn!(error = %err, "could not open session"),
                }
            });
        }
    });

    use_drop({
        let cancel = cancel.clone();
        move || {
            cancel.cancel();
            if let Ok(mut machine) = machine.try_write() {
                machine.teardown();
            }
        }
    });

    let on_submit = {
        let flow = flow.clone();
        move |file: UploadFile| {
            let started = machine.write().begin_upload(file.name.clone());
            match started {
                Ok(attempt) => {
                    spawn(run_upload(flow(attempt), file));
                }
                Err(err) => warn!(error = %err, "upload ignored"),
            }
        }
    };

    let on_restart = move |_: ()| {
        if let Err(err) = machine.write().restart() {
            warn!(error = %err, "restart ignored");
        }
    };

    let on_start_over = move |_: ()| {
        let next = machine.peek().successor();
        machine.set(next);
    };

    let (state, fresh) = {
        let machine = machine.read();
        (machine.state().clone(), machine.attempt() == 0)
    };

    let body = match state {
        SessionJobState::Idle if fresh && matches!(entry, SessionEntry::Existing(_)) => rsx! {
            BusyPanel { title: t!("hydrating-title"), detail: String::new() }
        },
        SessionJobState::Idle => rsx! {
            UploadPanel { on_submit }
        },
        SessionJobState::Uploading { file_name: name } => rsx! {
            BusyPanel {
                title: t!("uploading-title"),
                detail: t!("uploading-detail", file = name),
            }
        },
        SessionJobState::TriggeringAnalysis { .. } => rsx! {
            WaitingPanel { progress: 0.0 }
        },
        SessionJobState::Waiting { progress, .. } => rsx! {
            WaitingPanel { progress }
        },
        SessionJobState::Hydrating { session_id } => rsx! {
            BusyPanel {
                title: t!("hydrating-title"),
                detail: t!("hydrating-detail", session = session_id.to_string()),
            }
        },
        SessionJobState::Ready { session_id, result } => rsx! {
            ReportView { session_id, result, on_start_over }
        },
        SessionJobState::Failed { reason } => rsx! {
            FailurePanel { reason, on_restart }
        },
    };

    rsx! {
        div { class: "session", {body} }
    }
}

#[component]
fn UploadPanel(on_submit: EventHandler<UploadFile>) -> Element {
    use_language();
    let mut selected = use_signal(|| Option::<UploadFile>::None);
    let mut error = use_signal(|| Option::<String>::None);

    let on_pick = move |evt: FormEvent| async move {
        error.set(None);
        selected.set(None);
        let Some(engine) = evt.files() else {
            return;
        };
        let Some(path) = engine.files().into_iter().next() else {
            return;
        };
        if !is_csv_name(&path) {
            error.set(Some(t!("upload-error-not-csv")));
            return;
        }
        match engine.read_file(&path).await {
            Some(bytes) => selected.set(Some(UploadFile::new(file_name(&path), bytes))),
            None => {
                warn!(%path, "picked file could not be read");
                error.set(Some(t!("upload-error-unreadable")));
            }
        }
    };

    let submit = move |_| {
        let file = selected.write().take();
        match file {
            Some(file) => on_submit.call(file),
            None => error.set(Some(t!("upload-error-no-file"))),
        }
    };

    let selected_name = selected.read().as_ref().map(|file| file.name.clone());

    rsx! {
        section { class: "session-card session-upload",
            h2 { {t!("upload-title")} }
            p { class: "session-card__lead", {t!("upload-lead")} }

            label { class: "upload-drop", r#for: "dataset-input",
                span { class: "upload-drop__title", {t!("upload-choose")} }
                span { class: "upload-drop__hint", {t!("upload-hint")} }
                input {
                    id: "dataset-input",
                    class: "visually-hidden",
                    r#type: "file",
                    accept: ".csv,text/csv",
                    onchange: on_pick,
                }
            }

            if let Some(name) = selected_name {
                p { class: "upload-drop__selected", {t!("upload-selected", file = name)} }
            }
            if let Some(message) = error() {
                p { class: "session-card__error", role: "alert", "{message}" }
            }

            div { class: "session-card__actions",
                button {
                    r#type: "button",
                    class: "button button--primary",
                    onclick: submit,
                    {t!("upload-submit")}
                }
            }
        }
    }
}

#[component]
fn BusyPanel(title: String, detail: String) -> Element {
    use_language();
    rsx! {
        section { class: "session-card session-busy", aria_busy: "true",
            div { class: "spinner", aria_hidden: "true" }
            h2 { "{title}" }
            if !detail.is_empty() {
                p { class: "session-card__lead", "{detail}" }
            }
        }
    }
}

#[component]
fn WaitingPanel(progress: f64) -> Element {
    use_language();
    let done = steps_completed(progress);
    let label = format::format_progress(progress);
    let rounded = progress.round() as u32;
    let width = format!("width: {progress:.1}%");
    let steps = [
        t!("waiting-step-cleaning"),
        t!("waiting-step-kmeans"),
        t!("waiting-step-heatmap"),
        t!("waiting-step-funnel"),
    ]
    .into_iter()
    .enumerate()
    .map(|(idx, text)| {
        let complete = idx < done;
        let class = if complete {
            "session-steps__item session-steps__item--done"
        } else {
            "session-steps__item"
        };
        let marker = if complete {
            "✓".to_string()
        } else {
            (idx + 1).to_string()
        };
        (idx, class, marker, text)
    })
    .collect::<Vec<_>>();

    rsx! {
        section { class: "session-card session-waiting",
            h2 { {t!("waiting-title")} }
            p { class: "session-card__lead", {t!("waiting-lead")} }

            div {
                class: "progress",
                role: "progressbar",
                aria_valuemin: "0",
                aria_valuemax: "100",
                aria_valuenow: "{rounded}",
                div { class: "progress__header",
                    span { {t!("waiting-progress-label")} }
                    span { class: "progress__value", "{label}" }
                }
                div { class: "progress__track",
                    div { class: "progress__fill", style: "{width}" }
                }
            }

            h3 { class: "session-steps__title", {t!("waiting-steps-title")} }
            ol { class: "session-steps",
                for (idx, class, marker, text) in steps {
                    li { key: "{idx}", class: "{class}",
                        span { class: "session-steps__marker", "{marker}" }
                        span { "{text}" }
                    }
                }
            }

            p { class: "session-card__note", {t!("waiting-duration-note")} }
        }
    }
}

/// Full-page failure. `reason` is shown exactly as received.
#[component]
fn FailurePanel(reason: String, on_restart: EventHandler<()>) -> Element {
    use_language();
    rsx! {
        section { class: "session-card session-failed", role: "alert",
            div { class: "session-failed__icon", aria_hidden: "true", "!" }
            h2 { {t!("failure-title")} }
            p { class: "session-failed__reason", "{reason}" }
            div { class: "session-card__actions",
                button {
                    r#type: "button",
                    class: "button button--primary",
                    onclick: move |_| on_restart.call(()),
                    {t!("failure-restart")}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_check_is_by_extension() {
        assert!(is_csv_name("users.csv"));
        assert!(is_csv_name("USERS.CSV "));
        assert!(!is_csv_name("users.csv.txt"));
        assert!(!is_csv_name("users"));
    }

    #[test]
    fn picked_paths_are_reduced_to_file_names() {
        assert_eq!(file_name("/home/me/data/users.csv"), "users.csv");
        assert_eq!(file_name(r"C:\data\users.csv"), "users.csv");
        assert_eq!(file_name("users.csv"), "users.csv");
    }
}
