//! SQLite-based store implementation
//!
//! The table layout (`livros`) is kept compatible with catalogs created by
//! earlier versions of the tool, so existing database files open unchanged.

use bookshelf_util::BookId;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{validate_price, Book, BookStore, NewBook, StoreError, StoreResult};

const SELECT_BOOK: &str = "SELECT id, titulo, autor, ano_publicacao, preco FROM livros";

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("store lock poisoned".into()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS livros (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                titulo TEXT NOT NULL,
                autor TEXT NOT NULL,
                ano_publicacao INTEGER,
                preco REAL
            );

            CREATE INDEX IF NOT EXISTS idx_livros_autor ON livros(autor);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: BookId::new(row.get(0)?),
        title: row.get(1)?,
        author: row.get(2)?,
        year: row.get(3)?,
        price: row.get(4)?,
    })
}

impl BookStore for SqliteStore {
    fn insert_book(&self, book: &NewBook) -> StoreResult<BookId> {
        book.validate()?;
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO livros (titulo, autor, ano_publicacao, preco) VALUES (?, ?, ?, ?)",
            params![book.title, book.author, book.year, book.price],
        )?;

        let id = BookId::new(conn.last_insert_rowid());
        debug!(book_id = %id, title = %book.title, "Book inserted");
        Ok(id)
    }

    fn get_book(&self, id: BookId) -> StoreResult<Option<Book>> {
        let conn = self.conn()?;

        let book = conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_BOOK),
                [id.get()],
                book_from_row,
            )
            .optional()?;

        Ok(book)
    }

    fn list_books(&self) -> StoreResult<Vec<Book>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_BOOK))?;
        let books = stmt
            .query_map([], book_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(books)
    }

    fn find_by_author(&self, author: &str) -> StoreResult<Vec<Book>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!("{} WHERE autor = ? ORDER BY id", SELECT_BOOK))?;
        let books = stmt
            .query_map([author], book_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(books)
    }

    fn update_price(&self, id: BookId, price: f64) -> StoreResult<bool> {
        validate_price(price)?;
        let conn = self.conn()?;

        let changed = conn.execute(
            "UPDATE livros SET preco = ? WHERE id = ?",
            params![price, id.get()],
        )?;

        debug!(book_id = %id, price, changed, "Price updated");
        Ok(changed > 0)
    }

    fn delete_book(&self, id: BookId) -> StoreResult<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM livros WHERE id = ?", [id.get()])?;

        debug!(book_id = %id, changed, "Book deleted");
        Ok(changed > 0)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}
