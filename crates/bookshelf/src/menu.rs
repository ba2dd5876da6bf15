//! Numbered text menu
//!
//! Generic over its input and output so tests can script a session.

use anyhow::{Context, Result};
use bookshelf_core::{BackupReport, Catalog, ImportReport};
use bookshelf_store::{Book, BookStore, NewBook};
use bookshelf_util::{format_datetime_full, BookId, BookshelfError};
use std::io::{BufRead, Write};
use std::str::FromStr;
use tracing::debug;

/// File name suggested by the export/import prompts
pub const DEFAULT_CSV_FILE: &str = "livros.csv";

const MENU: &str = "
Menu:
1. Add a book
2. List all books
3. Update a book's price
4. Remove a book
5. Search books by author
6. Export to CSV
7. Import from CSV
8. Back up the database
9. Exit";

enum Flow {
    Continue,
    Exit,
}

/// Interactive menu bound to one catalog
pub struct Menu<'a, S: BookStore, R, W> {
    catalog: &'a Catalog<S>,
    input: R,
    output: W,
}

impl<'a, S, R, W> Menu<'a, S, R, W>
where
    S: BookStore,
    R: BufRead,
    W: Write,
{
    pub fn new(catalog: &'a Catalog<S>, input: R, output: W) -> Self {
        Self {
            catalog,
            input,
            output,
        }
    }

    /// Run until the user picks "exit" or input ends
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "{}", MENU)?;

            let choice = match self.prompt("Choose an option") {
                Ok(choice) => choice,
                Err(e) if is_end_of_input(&e) => break,
                Err(e) => return Err(e),
            };

            match self.dispatch(choice.trim()) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(e) if is_end_of_input(&e) => break,
                Err(e) => {
                    debug!(error = ?e, "Menu action failed");
                    writeln!(self.output, "Error: {:#}", e)?;
                }
            }
        }

        self.output.flush()?;
        Ok(())
    }

    fn dispatch(&mut self, choice: &str) -> Result<Flow> {
        match choice {
            "1" => self.add_book().context("Add book failed")?,
            "2" => self.list_books().context("Listing books failed")?,
            "3" => self.update_price().context("Price update failed")?,
            "4" => self.remove_book().context("Removing book failed")?,
            "5" => self.search_by_author().context("Author search failed")?,
            "6" => self.export_csv().context("CSV export failed")?,
            "7" => self.import_csv().context("CSV import failed")?,
            "8" => self.backup().context("Backup failed")?,
            "9" => return Ok(Flow::Exit),
            _ => writeln!(self.output, "Invalid option. Try again.")?,
        }
        Ok(Flow::Continue)
    }

    fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(BookshelfError::EndOfInput.into());
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn prompt_required(&mut self, label: &str) -> Result<String> {
        let value = self.prompt(label)?;
        if value.trim().is_empty() {
            return Err(BookshelfError::invalid(label.to_lowercase(), "cannot be empty").into());
        }
        Ok(value)
    }

    fn prompt_parsed<T>(&mut self, label: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.prompt_optional(label)?
            .ok_or_else(|| BookshelfError::invalid(label.to_lowercase(), "cannot be empty").into())
    }

    /// Blank input means no value
    fn prompt_optional<T>(&mut self, label: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let value = self.prompt(label)?;
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }

        value
            .parse::<T>()
            .map(Some)
            .map_err(|e| BookshelfError::invalid(label.to_lowercase(), e.to_string()).into())
    }

    fn prompt_file_name(&mut self, label: &str) -> Result<String> {
        let value = self.prompt(&format!("{} (e.g. {})", label, DEFAULT_CSV_FILE))?;
        let value = value.trim();
        Ok(if value.is_empty() {
            DEFAULT_CSV_FILE.to_string()
        } else {
            value.to_string()
        })
    }

    fn add_book(&mut self) -> Result<()> {
        let title = self.prompt_required("Title")?;
        let author = self.prompt_required("Author")?;
        let year = self.prompt_optional::<i32>("Publication year")?;
        let price = self.prompt_optional::<f64>("Price")?;

        let id = self.catalog.add_book(NewBook {
            title,
            author,
            year,
            price,
        })?;
        writeln!(self.output, "Book added with id {}.", id)?;
        Ok(())
    }

    fn list_books(&mut self) -> Result<()> {
        let books = self.catalog.list_books()?;
        self.print_books(&books, "The catalog is empty.")
    }

    fn update_price(&mut self) -> Result<()> {
        let id: BookId = self.prompt_parsed("Book id")?;
        let price: f64 = self.prompt_parsed("New price")?;

        self.catalog.update_price(id, price)?;
        writeln!(self.output, "Price of book {} updated.", id)?;
        Ok(())
    }

    fn remove_book(&mut self) -> Result<()> {
        let id: BookId = self.prompt_parsed("Book id")?;

        self.catalog.remove_book(id)?;
        writeln!(self.output, "Book {} removed.", id)?;
        Ok(())
    }

    fn search_by_author(&mut self) -> Result<()> {
        let author = self.prompt("Author")?;
        let books = self.catalog.search_by_author(&author)?;
        self.print_books(&books, "No books by that author.")
    }

    fn export_csv(&mut self) -> Result<()> {
        let file_name = self.prompt_file_name("CSV file name")?;
        let path = self.catalog.export_csv(&file_name)?;
        writeln!(self.output, "Catalog exported to {}.", path.display())?;
        Ok(())
    }

    fn import_csv(&mut self) -> Result<()> {
        let file_name = self.prompt_file_name("CSV file to import")?;
        let report = self.catalog.import_csv(&file_name)?;
        self.print_import(&file_name, &report)
    }

    fn backup(&mut self) -> Result<()> {
        let report = self.catalog.backup_now()?;
        self.print_backup(&report)
    }

    fn print_books(&mut self, books: &[Book], empty: &str) -> Result<()> {
        if books.is_empty() {
            writeln!(self.output, "{}", empty)?;
        }
        for book in books {
            writeln!(self.output, "{}", book)?;
        }
        Ok(())
    }

    fn print_import(&mut self, file_name: &str, report: &ImportReport) -> Result<()> {
        writeln!(
            self.output,
            "Imported {} book(s) from {}.",
            report.imported_count(),
            file_name
        )?;
        if !report.errors.is_empty() {
            writeln!(self.output, "Skipped {} row(s):", report.errors.len())?;
            for error in &report.errors {
                writeln!(self.output, "  {}", error)?;
            }
        }
        Ok(())
    }

    fn print_backup(&mut self, report: &BackupReport) -> Result<()> {
        writeln!(
            self.output,
            "Backup created: {} ({})",
            report.snapshot.path.display(),
            format_datetime_full(&report.snapshot.created_at)
        )?;
        if !report.prune.deleted.is_empty() {
            writeln!(
                self.output,
                "Removed {} old backup(s).",
                report.prune.deleted.len()
            )?;
        }
        for failure in &report.prune.failed {
            writeln!(self.output, "Warning: {}", failure)?;
        }
        Ok(())
    }
}

fn is_end_of_input(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<BookshelfError>(),
        Some(BookshelfError::EndOfInput)
    )
}
