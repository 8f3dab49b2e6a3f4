use dioxus::prelude::*;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::i18n;
use crate::t;

const NAVBAR_CSS: Asset = asset!("/assets/styling/navbar.css");
const NAVBAR_CSS_INLINE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/styling/navbar.css"
));

/// Link constructors supplied by the platform crate, so `ui` never needs the
/// platform's `Route` enum. Each closure receives the localized label.
///
/// ```ignore
/// register_nav(NavBuilder {
///     home: |label| rsx!(Link { class: "navbar__link", to: Route::Home {}, "{label}" }),
/// });
/// ```
pub struct NavBuilder {
    pub home: fn(label: &str) -> Element,
}

static NAV_BUILDER: OnceCell<NavBuilder> = OnceCell::new();

/// First registration wins.
pub fn register_nav(builder: NavBuilder) {
    if NAV_BUILDER.set(builder).is_err() {
        debug!("navigation builder already registered");
    }
}

#[component]
pub fn AppNavbar(children: Element) -> Element {
    i18n::init();

    let langs = use_signal(i18n::available_languages);
    let show_switcher = langs().len() > 1;
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let mut current_lang = use_signal(|| {
        lang_code
            .map(|code| code.peek().clone())
            .unwrap_or_else(|| "en-US".to_string())
    });
    // Subscribes this component to the shared language signal.
    let lang_marker = lang_code.map(|code| code()).unwrap_or_default();

    let on_change = move |evt: FormEvent| {
        let value = evt.value();
        match i18n::set_language(&value) {
            Ok(()) => {
                current_lang.set(value.clone());
                if let Some(mut code) = lang_code {
                    code.set(value);
                }
            }
            Err(err) => debug!(error = %err, %value, "language switch failed"),
        }
    };

    let nav = NAV_BUILDER.get().map(|builder| (builder.home)(&t!("nav-home")));

    rsx! {
        document::Link { rel: "stylesheet", href: NAVBAR_CSS }
        if cfg!(all(not(debug_assertions), not(target_arch = "wasm32"))) {
            document::Style { "{NAVBAR_CSS_INLINE}" }
        }

        header { id: "navbar", class: "navbar",
            div { style: "display:none", "{lang_marker}" }
            div { class: "navbar__inner",
                div { class: "navbar__brand",
                    span { class: "navbar__brand-link",
                        span { class: "navbar__brand-spark", aria_hidden: "true" }
                        span { class: "navbar__brand-mark", "Marketlens" }
                    }
                    span { class: "navbar__brand-subtitle", {t!("tagline")} }
                }

                nav { class: "navbar__links",
                    if let Some(link) = nav {
                        {link}
                    } else {
                        {children}
                    }
                }

                if show_switcher {
                    div { class: "navbar__locale",
                        label { class: "visually-hidden", r#for: "locale-select",
                            {t!("nav-language-label")}
                        }
                        select {
                            id: "locale-select",
                            value: "{current_lang}",
                            oninput: on_change,
                            for code in langs() {
                                option { key: "{code}", value: "{code}", "{code}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
