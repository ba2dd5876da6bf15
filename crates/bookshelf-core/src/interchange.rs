//! CSV interchange format
//!
//! Header: `id,titulo,autor,ano_publicacao,preco`. On import the `id` column
//! is ignored and the store assigns a new one. Empty year/price fields map to
//! no value, so exported records without them import back unchanged.

use bookshelf_store::{Book, NewBook};
use serde::Serialize;
use std::fmt;
use std::io::{Read, Write};

/// Column names, in order
pub const CSV_HEADER: [&str; 5] = ["id", "titulo", "autor", "ano_publicacao", "preco"];

#[derive(Serialize)]
struct CsvRow<'a> {
    id: i64,
    titulo: &'a str,
    autor: &'a str,
    ano_publicacao: Option<i32>,
    preco: Option<f64>,
}

/// Write `books` as CSV, header first
pub fn write_books<W: Write>(writer: W, books: &[Book]) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(CSV_HEADER)?;
    for book in books {
        wtr.serialize(CsvRow {
            id: book.id.get(),
            titulo: &book.title,
            autor: &book.author,
            ano_publicacao: book.year,
            preco: book.price,
        })?;
    }

    wtr.flush()?;
    Ok(())
}

/// Why a row was skipped
#[derive(Debug, Clone, PartialEq)]
pub enum RowErrorKind {
    /// Wrong number of fields
    MalformedRow { fields: usize },
    /// A numeric field did not parse
    FieldConversion {
        field: &'static str,
        value: String,
        message: String,
    },
    /// The store refused the record
    Insert(String),
    /// The CSV reader could not decode the row
    Unreadable(String),
}

impl fmt::Display for RowErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRow { fields } => {
                write!(f, "expected {} fields, found {}", CSV_HEADER.len(), fields)
            }
            Self::FieldConversion {
                field,
                value,
                message,
            } => write!(f, "cannot convert {} value '{}': {}", field, value, message),
            Self::Insert(msg) => write!(f, "insert failed: {}", msg),
            Self::Unreadable(msg) => write!(f, "unreadable row: {}", msg),
        }
    }
}

/// A skipped row, with its position and raw content
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number in the source file
    pub line: u64,
    pub raw: String,
    pub kind: RowErrorKind,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} in row [{}]", self.line, self.kind, self.raw)
    }
}

impl std::error::Error for RowError {}

/// A successfully decoded row
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRecord {
    pub line: u64,
    pub raw: String,
    pub book: NewBook,
}

impl CsvRecord {
    /// Turn a failure on this record into a reportable row error
    pub fn error(&self, kind: RowErrorKind) -> RowError {
        RowError {
            line: self.line,
            raw: self.raw.clone(),
            kind,
        }
    }
}

/// Decode every data row. The header row is skipped unchecked.
pub fn read_records<R: Read>(reader: R) -> Vec<Result<CsvRecord, RowError>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    rdr.records()
        .enumerate()
        .map(|(idx, result)| {
            // Header is line 1
            let fallback_line = idx as u64 + 2;
            match result {
                Ok(record) => {
                    let line = record.position().map_or(fallback_line, |p| p.line());
                    parse_record(&record, line)
                }
                Err(e) => Err(RowError {
                    line: e.position().map_or(fallback_line, |p| p.line()),
                    raw: String::new(),
                    kind: RowErrorKind::Unreadable(e.to_string()),
                }),
            }
        })
        .collect()
}

fn parse_record(record: &csv::StringRecord, line: u64) -> Result<CsvRecord, RowError> {
    let raw = encode_row(record);
    let error = |kind: RowErrorKind| RowError {
        line,
        raw: raw.clone(),
        kind,
    };

    if record.len() != CSV_HEADER.len() {
        return Err(error(RowErrorKind::MalformedRow {
            fields: record.len(),
        }));
    }

    let year = parse_optional::<i32>("ano_publicacao", &record[3]).map_err(error)?;
    let price = parse_optional::<f64>("preco", &record[4]).map_err(error)?;
    if let Some(p) = price
        && !p.is_finite()
    {
        return Err(error(RowErrorKind::FieldConversion {
            field: "preco",
            value: record[4].to_string(),
            message: "not a finite number".into(),
        }));
    }

    Ok(CsvRecord {
        line,
        raw,
        book: NewBook {
            title: record[1].to_string(),
            author: record[2].to_string(),
            year,
            price,
        },
    })
}

/// Re-encode a row as CSV so quoted fields stay quoted in reports
fn encode_row(record: &csv::StringRecord) -> String {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    let encoded = wtr
        .write_record(record)
        .ok()
        .and_then(|()| wtr.into_inner().ok());

    match encoded {
        Some(bytes) => String::from_utf8_lossy(&bytes)
            .trim_end_matches(['\r', '\n'])
            .to_string(),
        None => record.iter().collect::<Vec<_>>().join(","),
    }
}

fn parse_optional<T>(field: &'static str, value: &str) -> Result<Option<T>, RowErrorKind>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|e| RowErrorKind::FieldConversion {
            field,
            value: value.to_string(),
            message: e.to_string(),
        })
}
