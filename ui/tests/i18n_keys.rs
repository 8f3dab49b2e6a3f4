//! Fluent bundle checks that `fl!` cannot do at compile time: every locale
//! defines every fallback message with the same variables, and no file
//! defines a message twice.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

const FTL_FILENAME: &str = "marketlens-ui.ftl";
const FALLBACK: &str = "en-US";

/// Message id -> variables referenced by its value.
type Messages = BTreeMap<String, BTreeSet<String>>;

fn i18n_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("i18n")
}

fn is_message_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'))
        && !id.starts_with('-')
}

fn variables(pattern: &str) -> BTreeSet<String> {
    pattern
        .split("{ $")
        .skip(1)
        .filter_map(|rest| rest.split([' ', '}']).next())
        .map(str::to_string)
        .collect()
}

/// Single-line messages only; that is all these bundles use.
fn parse(locale: &str, src: &str) -> Messages {
    let mut messages = Messages::new();
    let mut duplicates = Vec::new();
    for line in src.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || line.starts_with(' ') {
            continue;
        }
        let Some((id, pattern)) = trimmed.split_once('=') else {
            continue;
        };
        let id = id.trim();
        if !is_message_id(id) {
            continue;
        }
        if messages.insert(id.to_string(), variables(pattern)).is_some() {
            duplicates.push(id.to_string());
        }
    }
    assert!(duplicates.is_empty(), "{locale} defines {duplicates:?} more than once");
    messages
}

fn load(dir: &Path) -> Messages {
    let locale = dir.file_name().and_then(|s| s.to_str()).unwrap_or_default();
    let path = dir.join(FTL_FILENAME);
    let src = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("cannot read {}: {err}", path.display()));
    parse(locale, &src)
}

fn locales() -> Vec<PathBuf> {
    let mut dirs = fs::read_dir(i18n_root())
        .expect("i18n directory")
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect::<Vec<_>>();
    dirs.sort();
    dirs
}

#[test]
fn fallback_bundle_is_present() {
    let fallback = load(&i18n_root().join(FALLBACK));
    assert!(fallback.contains_key("nav-home"));
    assert_eq!(fallback["upload-selected"], BTreeSet::from(["file".to_string()]));
}

#[test]
fn every_locale_matches_the_fallback() {
    let fallback = load(&i18n_root().join(FALLBACK));
    let mut problems = Vec::new();

    for dir in locales() {
        let locale = dir.file_name().unwrap().to_string_lossy().to_string();
        let messages = load(&dir);

        for (id, vars) in &fallback {
            match messages.get(id) {
                None => problems.push(format!("{locale}: missing `{id}`")),
                Some(found) if found != vars => problems.push(format!(
                    "{locale}: `{id}` uses {found:?}, fallback uses {vars:?}"
                )),
                Some(_) => {}
            }
        }
        for id in messages.keys().filter(|id| !fallback.contains_key(*id)) {
            problems.push(format!("{locale}: `{id}` is not in the fallback"));
        }
    }

    assert!(problems.is_empty(), "{}", problems.join("\n"));
}

#[test]
fn variables_are_extracted() {
    assert_eq!(
        variables(" Session { $session } · retrieved at { $time }"),
        BTreeSet::from(["session".to_string(), "time".to_string()])
    );
    assert!(variables(" Home").is_empty());
}

/// `fl!` derives its domain from `i18n.toml`, falling back to the package
/// name with underscores; the bundles must sit under the pinned name.
#[test]
fn configured_domain_names_the_bundles() {
    let config = fs::read_to_string(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("i18n.toml"))
        .expect("i18n.toml");
    let domain = config
        .lines()
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim() == "domain")
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .expect("i18n.toml pins a fluent domain");

    assert_eq!(format!("{domain}.ftl"), FTL_FILENAME);
    for dir in locales() {
        assert!(dir.join(FTL_FILENAME).is_file(), "{} has no bundle", dir.display());
    }
}
