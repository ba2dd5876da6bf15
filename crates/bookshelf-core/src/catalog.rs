//! Catalog operations
//!
//! Every mutating operation goes through the [`MutationGuard`], so the live
//! database is snapshotted before it changes. Reads are not guarded.

use bookshelf_config::Settings;
use bookshelf_store::{validate_price, Book, BookStore, NewBook, SqliteStore, StoreError};
use bookshelf_util::{now, BookId};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::guard::MutationGuard;
use crate::interchange::{read_records, write_books, CsvRecord, RowError, RowErrorKind};
use crate::retention::RETENTION_KEEP;
use crate::snapshot::{BackupReport, SnapshotError, SnapshotStore};

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Book not found: {0}")]
    RecordNotFound(BookId),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Outcome of a CSV import batch
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<BookId>,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    pub fn imported_count(&self) -> usize {
        self.imported.len()
    }
}

/// The book catalog: a record store plus its snapshot store
pub struct Catalog<S: BookStore> {
    store: S,
    snapshots: SnapshotStore,
    csv_dir: PathBuf,
}

impl Catalog<SqliteStore> {
    /// Create the configured directories and open the SQLite catalog
    pub fn open(settings: &Settings) -> CatalogResult<Self> {
        settings.create_directories()?;
        let store = SqliteStore::open(&settings.database)?;
        let snapshots = SnapshotStore::from_settings(settings)?;

        info!(
            catalog = %settings.catalog_name,
            database = %settings.database.display(),
            "Catalog opened"
        );
        Ok(Self::new(store, snapshots, settings.csv_dir.clone()))
    }
}

impl<S: BookStore> Catalog<S> {
    pub fn new(store: S, snapshots: SnapshotStore, csv_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            snapshots,
            csv_dir: csv_dir.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn csv_dir(&self) -> &Path {
        &self.csv_dir
    }

    fn guard(&self) -> MutationGuard<'_> {
        MutationGuard::new(&self.snapshots)
    }

    /// Insert a new book. Invalid records are refused before any snapshot.
    pub fn add_book(&self, book: NewBook) -> CatalogResult<BookId> {
        book.validate()?;
        self.guard().run(|| -> CatalogResult<BookId> {
            let id = self.store.insert_book(&book)?;
            info!(book_id = %id, title = %book.title, "Book added");
            Ok(id)
        })
    }

    /// Change the price of an existing book.
    ///
    /// The snapshot is taken before the id is checked, but after the price
    /// is validated.
    pub fn update_price(&self, id: BookId, price: f64) -> CatalogResult<()> {
        validate_price(price)?;
        self.guard().run(|| -> CatalogResult<()> {
            if !self.store.update_price(id, price)? {
                return Err(CatalogError::RecordNotFound(id));
            }
            info!(book_id = %id, price, "Price updated");
            Ok(())
        })
    }

    /// Delete a book. The snapshot is taken before the id is checked.
    pub fn remove_book(&self, id: BookId) -> CatalogResult<()> {
        self.guard().run(|| -> CatalogResult<()> {
            if !self.store.delete_book(id)? {
                return Err(CatalogError::RecordNotFound(id));
            }
            info!(book_id = %id, "Book removed");
            Ok(())
        })
    }

    /// All books ordered by id
    pub fn list_books(&self) -> CatalogResult<Vec<Book>> {
        Ok(self.store.list_books()?)
    }

    /// Books whose author matches exactly
    pub fn search_by_author(&self, author: &str) -> CatalogResult<Vec<Book>> {
        Ok(self.store.find_by_author(author)?)
    }

    /// Write every book to `<csv_dir>/<file_name>` and return the path
    pub fn export_csv(&self, file_name: &str) -> CatalogResult<PathBuf> {
        fs::create_dir_all(&self.csv_dir)?;
        let books = self.store.list_books()?;
        let path = self.csv_dir.join(file_name);

        let file = File::create(&path)?;
        write_books(BufWriter::new(file), &books)?;

        info!(path = %path.display(), count = books.len(), "Catalog exported");
        Ok(path)
    }

    /// Import `<csv_dir>/<file_name>` under a single snapshot.
    ///
    /// Bad rows are skipped and reported; the rest of the batch continues.
    pub fn import_csv(&self, file_name: &str) -> CatalogResult<ImportReport> {
        let path = self.csv_dir.join(file_name);

        self.guard().run(|| -> CatalogResult<ImportReport> {
            let file = match File::open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(CatalogError::FileNotFound(path.clone()));
                }
                Err(e) => return Err(e.into()),
            };

            let report = self.insert_records(read_records(BufReader::new(file)));
            info!(
                path = %path.display(),
                imported = report.imported_count(),
                skipped = report.errors.len(),
                "CSV import finished"
            );
            Ok(report)
        })
    }

    /// Import already-decoded rows under a single snapshot
    pub fn import_records(
        &self,
        records: Vec<Result<CsvRecord, RowError>>,
    ) -> CatalogResult<ImportReport> {
        self.guard()
            .run(|| -> CatalogResult<ImportReport> { Ok(self.insert_records(records)) })
    }

    fn insert_records(&self, records: Vec<Result<CsvRecord, RowError>>) -> ImportReport {
        let mut report = ImportReport::default();

        for record in records {
            let result = record.and_then(|record| {
                self.store
                    .insert_book(&record.book)
                    .map_err(|e| record.error(RowErrorKind::Insert(e.to_string())))
            });

            match result {
                Ok(id) => report.imported.push(id),
                Err(e) => {
                    warn!(line = e.line, error = %e, "CSV row skipped");
                    report.errors.push(e);
                }
            }
        }

        report
    }

    /// Manual backup: snapshot and prune without a mutation
    pub fn backup_now(&self) -> CatalogResult<BackupReport> {
        Ok(self.snapshots.snapshot_and_prune(now(), RETENTION_KEEP)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open() -> (TempDir, Catalog<SqliteStore>) {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::in_dir(dir.path(), "livraria");
        let catalog = Catalog::open(&settings).unwrap();
        (dir, catalog)
    }

    fn snapshot_count(catalog: &Catalog<SqliteStore>) -> usize {
        catalog.snapshots().list_snapshots().unwrap().len()
    }

    #[test]
    fn add_takes_snapshot_first() {
        let (_dir, catalog) = open();

        let id = catalog
            .add_book(NewBook::new("A", "Auth").with_year(2000).with_price(9.99))
            .unwrap();

        assert_eq!(snapshot_count(&catalog), 1);
        let books = catalog.list_books().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, id);
    }

    #[test]
    fn reads_do_not_snapshot() {
        let (_dir, catalog) = open();

        catalog.list_books().unwrap();
        catalog.search_by_author("Nobody").unwrap();
        catalog.export_csv("out.csv").unwrap();

        assert_eq!(snapshot_count(&catalog), 0);
    }

    #[test]
    fn update_and_remove_missing_id() {
        let (_dir, catalog) = open();
        let missing = BookId::new(404);

        let result = catalog.update_price(missing, 1.0);
        assert!(matches!(result, Err(CatalogError::RecordNotFound(id)) if id == missing));

        let result = catalog.remove_book(missing);
        assert!(matches!(result, Err(CatalogError::RecordNotFound(_))));

        // Snapshots still happen before the existence check
        assert_eq!(snapshot_count(&catalog), 2);
    }

    #[test]
    fn update_price_changes_record() {
        let (_dir, catalog) = open();
        let id = catalog.add_book(NewBook::new("A", "Auth")).unwrap();

        catalog.update_price(id, 12.5).unwrap();

        let book = catalog.store().get_book(id).unwrap().unwrap();
        assert_eq!(book.price, Some(12.5));
    }

    #[test]
    fn non_finite_price_is_refused_without_snapshot() {
        let (_dir, catalog) = open();

        let result = catalog.add_book(NewBook::new("A", "Auth").with_price(f64::INFINITY));
        assert!(matches!(
            result,
            Err(CatalogError::Store(StoreError::InvalidRecord(_)))
        ));
        assert_eq!(snapshot_count(&catalog), 0);

        let id = catalog.add_book(NewBook::new("B", "Auth").with_price(5.0)).unwrap();
        let result = catalog.update_price(id, f64::NAN);
        assert!(matches!(
            result,
            Err(CatalogError::Store(StoreError::InvalidRecord(_)))
        ));

        assert_eq!(snapshot_count(&catalog), 1);
        let book = catalog.store().get_book(id).unwrap().unwrap();
        assert_eq!(book.price, Some(5.0));
    }

    #[test]
    fn snapshot_captures_pre_mutation_state() {
        let (_dir, catalog) = open();
        catalog.add_book(NewBook::new("Kept", "Auth")).unwrap();
        let id = catalog.add_book(NewBook::new("Removed", "Auth")).unwrap();

        catalog.remove_book(id).unwrap();

        let latest = catalog.snapshots().list_snapshots().unwrap().pop().unwrap();
        let restored = SqliteStore::open(&latest.path).unwrap();
        assert_eq!(restored.list_books().unwrap().len(), 2);
        assert_eq!(catalog.list_books().unwrap().len(), 1);
    }

    #[test]
    fn snapshot_failure_leaves_store_untouched() {
        let (_dir, catalog) = open();
        catalog.add_book(NewBook::new("A", "Auth")).unwrap();

        // Make the backup directory unusable
        let backups = catalog.snapshots().backup_dir().to_path_buf();
        fs::remove_dir_all(&backups).unwrap();
        fs::write(&backups, b"not a directory").unwrap();

        let result = catalog.add_book(NewBook::new("B", "Auth"));
        assert!(matches!(result, Err(CatalogError::Snapshot(_))));
        assert_eq!(catalog.list_books().unwrap().len(), 1);
    }

    #[test]
    fn import_missing_file() {
        let (_dir, catalog) = open();

        let result = catalog.import_csv("absent.csv");
        assert!(matches!(result, Err(CatalogError::FileNotFound(_))));
        assert!(catalog.list_books().unwrap().is_empty());
    }

    #[test]
    fn import_batch_takes_one_snapshot() {
        let (_dir, catalog) = open();
        fs::write(
            catalog.csv_dir().join("batch.csv"),
            "id,titulo,autor,ano_publicacao,preco\n\
             1,One,Auth,2001,1.0\n\
             2,Two,Auth,2002,2.0\n\
             3,,Auth,2003,3.0\n\
             4,Four,Auth\n",
        )
        .unwrap();

        let report = catalog.import_csv("batch.csv").unwrap();

        assert_eq!(report.imported_count(), 2);
        assert_eq!(report.errors.len(), 2);
        assert!(matches!(report.errors[0].kind, RowErrorKind::Insert(_)));
        assert_eq!(report.errors[0].line, 4);
        assert!(matches!(
            report.errors[1].kind,
            RowErrorKind::MalformedRow { fields: 3 }
        ));
        assert_eq!(snapshot_count(&catalog), 1);
    }

    #[test]
    fn retention_holds_across_operations() {
        let (_dir, catalog) = open();

        for n in 0..8 {
            catalog.add_book(NewBook::new(format!("Book {}", n), "Auth")).unwrap();
            assert_eq!(snapshot_count(&catalog), (n + 1).min(RETENTION_KEEP));
        }
    }

    #[test]
    fn manual_backup() {
        let (_dir, catalog) = open();

        let report = catalog.backup_now().unwrap();
        assert!(report.snapshot.path.exists());
        assert!(report.prune.deleted.is_empty());
    }
}
