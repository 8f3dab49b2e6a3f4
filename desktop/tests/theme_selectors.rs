#![cfg(test)]
//! Selectors the shared components render must stay in the inlined theme.
//! Renaming a class in markup means updating this list too.

const THEME_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

const REQUIRED_SELECTORS: &[&str] = &[
    ":root",
    "--color-bg",
    "body {",
    ".page {",
    ".visually-hidden",
    ".button {",
    ".button--primary",
    ".button--ghost",
    ".spinner",
    // Session flow
    ".session-card",
    ".session-card__error",
    ".upload-drop",
    ".progress__fill",
    ".session-steps__item--done",
    ".session-failed__reason",
    // Report
    ".report__header",
    ".report__toolbar",
    ".report__notice--error",
    ".report__partial",
    ".report-section",
    ".stat-card__value",
    ".stats-table",
    // Chart tiles and the enlarge overlay
    ".resource-tile__frame--error",
    ".resource-tile__image--loading",
    ".resource-tile__url",
    ".modal-backdrop",
    ".modal__image",
    "@media (max-width: 720px)",
];

#[test]
fn theme_has_required_selectors() {
    let missing: Vec<_> = REQUIRED_SELECTORS
        .iter()
        .filter(|selector| !THEME_CSS.contains(**selector))
        .collect();
    assert!(missing.is_empty(), "theme is missing: {missing:?}");
}
