//! Integration tests for bookshelf
//!
//! These exercise the catalog end to end against a real SQLite file and
//! backup directory.

use bookshelf::Menu;
use bookshelf_config::Settings;
use bookshelf_core::{
    decide, read_records, Catalog, CatalogError, RowErrorKind, SnapshotError, SnapshotStore,
    RETENTION_KEEP,
};
use bookshelf_store::{BookStore, NewBook, SqliteStore};
use chrono::{DateTime, Local, TimeZone};
use std::fs;
use tempfile::TempDir;

fn open_catalog() -> (TempDir, Settings, Catalog<SqliteStore>) {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::in_dir(dir.path(), "livraria");
    let catalog = Catalog::open(&settings).unwrap();
    (dir, settings, catalog)
}

fn at(secs: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap() + chrono::Duration::seconds(secs as i64)
}

#[test]
fn test_startup_creates_directories() {
    let (_dir, settings, _catalog) = open_catalog();

    assert!(settings.backup_dir.is_dir());
    assert!(settings.csv_dir.is_dir());
    assert!(settings.database.is_file());

    // Reopening is idempotent
    Catalog::open(&settings).unwrap();
}

#[test]
fn test_snapshot_count_is_bounded() {
    let (_dir, settings, _catalog) = open_catalog();
    let snapshots = SnapshotStore::from_settings(&settings).unwrap();

    for n in 0..12u32 {
        snapshots.snapshot_and_prune(at(n), RETENTION_KEEP).unwrap();
        let count = snapshots.list_snapshots().unwrap().len();
        assert_eq!(count, (n as usize + 1).min(RETENTION_KEEP));
    }

    // The survivors are the five most recent
    let names: Vec<_> = snapshots
        .list_snapshots()
        .unwrap()
        .iter()
        .map(|s| s.file_name().to_string())
        .collect();
    assert_eq!(names.first().unwrap(), "livraria_backup_20240115_090007.db");
    assert_eq!(names.last().unwrap(), "livraria_backup_20240115_090011.db");
}

#[test]
fn test_retention_on_seven_snapshots() {
    let (_dir, settings, _catalog) = open_catalog();
    let snapshots = SnapshotStore::from_settings(&settings).unwrap();
    for n in 0..7 {
        snapshots.create_snapshot_at(at(n)).unwrap();
    }

    let listed = snapshots.list_snapshots().unwrap();
    let decision = decide(listed.clone(), 5);

    assert_eq!(decision.delete, listed[..2].to_vec());
    assert_eq!(decision.keep, listed[2..].to_vec());
}

#[test]
fn test_failed_snapshot_blocks_mutation() {
    let (_dir, settings, catalog) = open_catalog();
    let id = catalog.add_book(NewBook::new("A", "Auth").with_price(5.0)).unwrap();

    // Point a second catalog at a live store that does not exist
    let broken = SnapshotStore::open(
        "livraria",
        settings.database.with_file_name("missing.db"),
        &settings.backup_dir,
    )
    .unwrap();
    let guarded = Catalog::new(
        SqliteStore::open(&settings.database).unwrap(),
        broken,
        &settings.csv_dir,
    );

    let result = guarded.update_price(id, 99.0);
    assert!(matches!(
        result,
        Err(CatalogError::Snapshot(SnapshotError::Failed { .. }))
    ));

    let result = guarded.remove_book(id);
    assert!(matches!(result, Err(CatalogError::Snapshot(_))));

    let book = catalog.store().get_book(id).unwrap().unwrap();
    assert_eq!(book.price, Some(5.0));
}

#[test]
fn test_listing_is_idempotent() {
    let (_dir, settings, _catalog) = open_catalog();
    let snapshots = SnapshotStore::from_settings(&settings).unwrap();
    for n in 0..3 {
        snapshots.create_snapshot_at(at(n)).unwrap();
    }

    assert_eq!(
        snapshots.list_snapshots().unwrap(),
        snapshots.list_snapshots().unwrap()
    );
}

#[test]
fn test_csv_round_trip() {
    let (_dir, _settings, source) = open_catalog();
    source
        .add_book(NewBook::new("A", "Auth").with_year(2000).with_price(9.99))
        .unwrap();
    let path = source.export_csv("livros.csv").unwrap();

    let (_dir2, _settings2, target) = open_catalog();
    fs::copy(&path, target.csv_dir().join("livros.csv")).unwrap();
    let report = target.import_csv("livros.csv").unwrap();

    assert_eq!(report.imported_count(), 1);
    assert!(report.errors.is_empty());

    let books = target.list_books().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "A");
    assert_eq!(books[0].author, "Auth");
    assert_eq!(books[0].year, Some(2000));
    assert_eq!(books[0].price, Some(9.99));
}

#[test]
fn test_import_skips_bad_year() {
    let (_dir, _settings, catalog) = open_catalog();
    fs::write(
        catalog.csv_dir().join("mixed.csv"),
        "id,titulo,autor,ano_publicacao,preco\n\
         1,Good,Auth,1999,10.5\n\
         2,Bad,Auth,abc,3.0\n",
    )
    .unwrap();

    let report = catalog.import_csv("mixed.csv").unwrap();

    assert_eq!(report.imported_count(), 1);
    assert_eq!(report.errors.len(), 1);
    let error = &report.errors[0];
    assert!(matches!(
        error.kind,
        RowErrorKind::FieldConversion { field: "ano_publicacao", .. }
    ));
    assert_eq!(error.raw, "2,Bad,Auth,abc,3.0");
}

#[test]
fn test_import_records_directly() {
    let (_dir, _settings, catalog) = open_catalog();
    let input = "id,titulo,autor,ano_publicacao,preco\n9,X,Y,2010,1.25\n";

    let report = catalog.import_records(read_records(input.as_bytes())).unwrap();

    assert_eq!(report.imported_count(), 1);
    assert_eq!(catalog.snapshots().list_snapshots().unwrap().len(), 1);
}

#[test]
fn test_backup_names_sort_in_creation_order() {
    let (_dir, settings, _catalog) = open_catalog();
    let snapshots = SnapshotStore::from_settings(&settings).unwrap();

    let first = snapshots.create_snapshot_at(at(0)).unwrap();
    let second = snapshots.create_snapshot_at(at(60)).unwrap();

    assert!(first.file_name() < second.file_name());
    let listed = snapshots.list_snapshots().unwrap();
    assert_eq!(listed, vec![first, second]);
}

#[test]
fn test_menu_session() {
    let (_dir, _settings, catalog) = open_catalog();
    let input = "1\nO Alienista\nMachado\n1882\n19.9\n\
                 1\nMemorias\nMachado\n1881\n\n\
                 3\n1\n25\n\
                 5\nMachado\n\
                 6\nout.csv\n\
                 4\n2\n\
                 2\n\
                 9\n";

    let mut output = Vec::new();
    Menu::new(&catalog, input.as_bytes(), &mut output)
        .run()
        .unwrap();
    let output = String::from_utf8(output).unwrap();

    assert!(output.contains("Book added with id 1."));
    assert!(output.contains("Book added with id 2."));
    assert!(output.contains("Price of book 1 updated."));
    assert!(output.contains("Book 2 removed."));
    assert!(output.contains("[1] O Alienista by Machado (1882) - 25.00"));
    assert!(catalog.csv_dir().join("out.csv").is_file());

    // add, add, update, remove
    assert_eq!(catalog.snapshots().list_snapshots().unwrap().len(), 4);
    assert_eq!(catalog.list_books().unwrap().len(), 1);
}

#[test]
fn test_menu_export_reimports_after_rejected_prices() {
    let (_dir, _settings, source) = open_catalog();
    let input = "1\nA\nAuth\n2000\ninf\n\
                 1\nB\nAuth\n2001\n5\n\
                 3\n1\nnan\n\
                 6\nout.csv\n\
                 9\n";

    let mut output = Vec::new();
    Menu::new(&source, input.as_bytes(), &mut output)
        .run()
        .unwrap();

    let (_dir2, _settings2, target) = open_catalog();
    fs::copy(
        source.csv_dir().join("out.csv"),
        target.csv_dir().join("out.csv"),
    )
    .unwrap();
    let report = target.import_csv("out.csv").unwrap();

    assert!(report.errors.is_empty());
    let books = target.list_books().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "B");
    assert_eq!(books[0].price, Some(5.0));
}
