use std::{sync::Arc, time::Duration};

use hemicycle_i18n::{Catalogs, Layout, Origin, Translator};
use tempfile::tempdir;

fn catalogs() -> Arc<Catalogs> {
    Arc::new(Catalogs::bundled().expect("bundled catalogs parse"))
}

#[test]
fn tabs_of_one_origin_follow_each_other() {
    let dir = tempdir().unwrap();
    let origin = Origin::open(&Layout::new(dir.path().to_path_buf()), "en").unwrap();
    let first = Translator::new(catalogs(), origin.context());
    let second = Translator::new(catalogs(), origin.context());
    let mut first_changes = first.watch();

    second.change_language("fr").unwrap();
    assert_eq!(first.locale(), "fr");
    assert_eq!(first.t("nav.votes"), "Scrutins");
    assert!(first_changes.has_changed().unwrap());
    first_changes.borrow_and_update();

    first.change_language("en").unwrap();
    assert_eq!(second.locale(), "en");
    // last writer wins on the shared slot
    assert_eq!(origin.context().get(), "en");
}

#[test]
fn separate_origins_are_isolated() {
    let first_dir = tempdir().unwrap();
    let second_dir = tempdir().unwrap();
    let first = Origin::open(&Layout::new(first_dir.path().to_path_buf()), "en").unwrap();
    let second = Origin::open(&Layout::new(second_dir.path().to_path_buf()), "en").unwrap();
    let translator = Translator::new(catalogs(), second.context());

    Translator::new(catalogs(), first.context()).change_language("fr").unwrap();
    assert!(!second.poll_external().unwrap());
    assert_eq!(translator.locale(), "en");
}

#[test]
fn dropped_translator_stops_listening() {
    let dir = tempdir().unwrap();
    let origin = Origin::open(&Layout::new(dir.path().to_path_buf()), "en").unwrap();
    let writer = Translator::new(catalogs(), origin.context());
    let listener = Translator::new(catalogs(), origin.context());
    let changes = listener.watch();
    drop(listener);

    writer.change_language("fr").unwrap();
    assert!(changes.has_changed().is_err(), "sender dropped with the translator");
}

#[tokio::test]
async fn watcher_picks_up_writes_from_another_process() {
    let dir = tempdir().unwrap();
    let layout = Layout::new(dir.path().to_path_buf());
    let here = Origin::open(&layout, "en").unwrap();
    let elsewhere = Origin::open(&layout, "en").unwrap();

    let translator = Translator::new(catalogs(), here.context());
    let mut changes = translator.watch();
    let watcher = here.spawn_watcher(Duration::from_millis(20));

    elsewhere.context().set("fr").unwrap();
    tokio::time::timeout(Duration::from_secs(5), changes.changed())
        .await
        .expect("watcher noticed the external write")
        .expect("translator still alive");

    assert_eq!(*changes.borrow_and_update(), "fr");
    assert_eq!(translator.t("common.actions.print"), "Imprimer");
    watcher.abort();
}

#[test]
fn external_unknown_locale_falls_back_to_default() {
    let dir = tempdir().unwrap();
    let layout = Layout::new(dir.path().to_path_buf());
    let here = Origin::open(&layout, "en").unwrap();
    let translator = Translator::new(catalogs(), here.context());
    translator.change_language("fr").unwrap();

    Origin::open(&layout, "en").unwrap().context().set("tlh").unwrap();
    assert!(here.poll_external().unwrap());
    assert_eq!(translator.locale(), "en");
}
