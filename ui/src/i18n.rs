//! Localized strings for `marketlens-ui`.
//!
//! Fluent bundles are embedded at compile time from `i18n/<lang>/marketlens-ui.ftl`
//! (`en-US` is the fallback and reference). `fl!` lookups are checked against
//! the fallback file when the crate builds, so every key used through [`t!`]
//! must exist there with the same variables.
//!
//! ```ignore
//! ui::i18n::init();
//! let label = ui::t!("nav-home");
//! ```
//!
//! The browser build asks `navigator.languages`; desktop uses the OS locale list.
use std::sync::Once;

use dioxus::prelude::{try_use_context, Readable, Signal};
use i18n_embed::fluent::FluentLanguageLoader;
use once_cell::sync::Lazy;
use rust_embed::Embed;
use tracing::{debug, warn};
use unic_langid::{langid, LanguageIdentifier};

pub use i18n_embed_fl::fl;

/// Looks a message up through the shared [`LOADER`]:
/// `t!("upload-title")`, `t!("upload-selected", file = name)`.
#[macro_export]
macro_rules! t {
    ($key:literal) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key)
    };
    ($key:literal, $( $arg:ident = $value:expr ),+ $(,)?) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key, $( $arg = $value ),+ )
    };
}

/// Fluent domain; also the FTL file name in every locale folder.
const DOMAIN: &str = "marketlens-ui";

const FALLBACK: LanguageIdentifier = langid!("en-US");

#[derive(Embed)]
#[folder = "i18n"]
struct Localizations;

pub static LOADER: Lazy<FluentLanguageLoader> =
    Lazy::new(|| FluentLanguageLoader::new(DOMAIN, FALLBACK));

static INIT: Once = Once::new();

/// Loads bundles for the requested languages. Safe to call repeatedly.
pub fn init() {
    INIT.call_once(|| {
        let requested = requested_languages();
        match i18n_embed::select(&*LOADER, &Localizations, &requested) {
            Ok(selected) => debug!(?selected, "localization loaded"),
            Err(err) => warn!(error = %err, "language selection failed, using fallback"),
        }
    });
}

/// Switches language at runtime. Tags that do not parse are ignored.
pub fn set_language(tag: &str) -> Result<(), i18n_embed::I18nEmbedError> {
    let Ok(lang) = tag.parse::<LanguageIdentifier>() else {
        debug!(%tag, "ignoring unparsable language tag");
        return Ok(());
    };
    i18n_embed::select(&*LOADER, &Localizations, &[lang]).map(|_| ())
}

/// Embedded language tags, sorted.
pub fn available_languages() -> Vec<String> {
    let mut langs = Localizations::iter()
        .filter_map(|path| path.split('/').next().map(str::to_string))
        .collect::<Vec<_>>();
    langs.sort();
    langs.dedup();
    langs
}

/// Subscribes the calling component to the language picked in the navbar so
/// its `t!` strings follow a switch. Returns the current tag, or an empty
/// string when no shell provides one.
pub fn use_language() -> String {
    try_use_context::<Signal<String>>()
        .map(|code| code.read().clone())
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::WebLanguageRequester::requested_languages()
}

#[cfg(not(target_arch = "wasm32"))]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::DesktopLanguageRequester::requested_languages()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_locales_are_embedded() {
        assert_eq!(available_languages(), vec!["en-US", "zh-CN"]);
    }

    // One test: the loader is process-wide.
    #[test]
    fn runtime_switching() {
        init();
        set_language("zh-CN").unwrap();
        assert_eq!(fl!(&*LOADER, "upload-submit"), "开始分析");

        let _ = set_language("not a tag");
        assert_eq!(fl!(&*LOADER, "upload-submit"), "开始分析");

        set_language("en-US").unwrap();
        assert_eq!(fl!(&*LOADER, "nav-home"), "Home");
    }
}
