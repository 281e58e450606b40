use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli_with_root(root: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("hemicycle-i18n").expect("binary exists");
    cmd.args(["--root", root.to_str().unwrap()]);
    cmd.args(args);
    // Force English output for consistent test assertions
    cmd.env("HEMICYCLE_LANG", "en");
    cmd.env_remove("HEMICYCLE_DEFAULT_LOCALE");
    cmd.assert()
}

#[test]
fn lookup_uses_stored_locale_and_params() {
    let tmp = tempdir().expect("temp dir");

    cli_with_root(tmp.path(), &["lookup", "deputies.list.count", "--param", "count=577"])
        .success()
        .stdout("577 deputies\n");

    cli_with_root(tmp.path(), &["locale", "set", "fr"])
        .success()
        .stdout(predicate::str::contains("fr"));
    let stored = fs::read_to_string(tmp.path().join("state/locale")).expect("preference written");
    assert_eq!(stored, "fr");

    cli_with_root(tmp.path(), &["locale", "get"]).success().stdout("fr\n");
    cli_with_root(tmp.path(), &["lookup", "common.status.loading"])
        .success()
        .stdout("Chargement…\n");
    cli_with_root(tmp.path(), &["lookup", "common.status.loading", "--locale", "en"])
        .success()
        .stdout("Loading…\n");
}

#[test]
fn missing_key_prints_the_key() {
    let tmp = tempdir().expect("temp dir");
    cli_with_root(tmp.path(), &["lookup", "pages.nowhere"]).success().stdout("pages.nowhere\n");
}

#[test]
fn unknown_locale_is_reported_in_the_active_language() {
    let tmp = tempdir().expect("temp dir");
    cli_with_root(tmp.path(), &["locale", "set", "de"])
        .failure()
        .stderr(predicate::str::contains("Error: No catalog is available for locale 'de'."));
    assert!(!tmp.path().join("state/locale").exists());
}

#[test]
fn malformed_param_is_rejected() {
    let tmp = tempdir().expect("temp dir");
    cli_with_root(tmp.path(), &["lookup", "deputies.detail.title", "--param", "name"])
        .failure()
        .stderr(predicate::str::contains("name=value"));
}

#[test]
fn coverage_lists_missing_french_keys() {
    let tmp = tempdir().expect("temp dir");
    cli_with_root(tmp.path(), &["coverage"])
        .success()
        .stdout(predicate::str::contains("en: "))
        .stdout(predicate::str::contains("missing: deputies.detail.twitter"));
}

#[test]
fn keys_and_lookup_use_catalog_directory() {
    let tmp = tempdir().expect("temp dir");
    let catalogs = tmp.path().join("catalogs");
    fs::create_dir(&catalogs).unwrap();
    fs::write(catalogs.join("en.json"), r#"{"nav": {"home": "Home", "votes": "Votes"}}"#).unwrap();
    fs::write(catalogs.join("nl.toml"), "[nav]\nhome = \"Start\"\n").unwrap();
    let dir_arg = catalogs.to_str().unwrap();

    cli_with_root(tmp.path(), &["--catalogs", dir_arg, "keys", "--locale", "nl"])
        .success()
        .stdout("nav.home\n");
    cli_with_root(tmp.path(), &["--catalogs", dir_arg, "lookup", "nav.home", "--locale", "nl"])
        .success()
        .stdout("Start\n");
    cli_with_root(tmp.path(), &["--catalogs", dir_arg, "lookup", "nav"])
        .success()
        .stdout("nav.home\nnav.votes\n");
}

#[test]
fn root_catalog_directory_replaces_bundled_catalogs() {
    let tmp = tempdir().expect("temp dir");
    let catalogs = tmp.path().join("catalogs");
    fs::create_dir(&catalogs).unwrap();
    fs::write(catalogs.join("en.json"), r#"{"nav": {"home": "Front page"}}"#).unwrap();

    cli_with_root(tmp.path(), &["lookup", "nav.home"]).success().stdout("Front page\n");
    cli_with_root(tmp.path(), &["keys"]).success().stdout("nav.home\n");
    cli_with_root(tmp.path(), &["keys", "--locale", "fr"])
        .failure()
        .stderr(predicate::str::contains("No catalog is available for locale 'fr'."));
}
