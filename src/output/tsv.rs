//! Tab-separated card list
//!
//! One header row, then one row per card. Free text is escaped so that every
//! record stays on a single physical line:
//!
//! | Character | Written as |
//! |-----------|------------|
//! | `\` | `\\` |
//! | newline | `\n` |
//! | carriage return | `\r` |
//! | tab | `\t` |

use crate::card::{CardField, CardRecord};
use crate::output::traits::RecordSink;
use crate::{CardlistError, Result};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Column order of the header and every row
pub const COLUMNS: [&str; 11] = [
    "cardno",
    "name",
    "class",
    "cost",
    "power",
    "hp",
    "kind",
    "rarity",
    "expansion",
    "ability",
    "url",
];

/// Escapes a cell value
///
/// # Example
///
/// ```
/// use sve_cardlist::output::escape_field;
///
/// assert_eq!(escape_field("Ward\tLast Words:\ndraw"), "Ward\\tLast Words:\\ndraw");
/// assert_eq!(escape_field(r"a\b"), r"a\\b");
/// ```
pub fn escape_field(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Reverses `escape_field`
///
/// Unknown escape sequences and a trailing lone backslash are kept verbatim.
pub fn unescape_field(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => unescaped.push('\\'),
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('t') => unescaped.push('\t'),
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }

    unescaped
}

fn record_cells(record: &CardRecord) -> Vec<String> {
    let mut cells = Vec::with_capacity(COLUMNS.len());
    cells.push(escape_field(&record.cardno));
    for field in CardField::all_fields() {
        cells.push(record.get(field).map(escape_field).unwrap_or_default());
    }
    cells.push(record.url.as_deref().map(escape_field).unwrap_or_default());
    cells
}

/// Writes `records` to `path`, replacing any existing file
///
/// Missing parent directories are created. Returns the number of rows
/// written, header excluded. Cells are escaped rather than quoted.
///
/// # Errors
///
/// `Io` when the directory cannot be created or the file cannot be written.
pub fn write_tsv(records: &[CardRecord], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .from_writer(File::create(path)?);

    writer.write_record(COLUMNS)?;
    for record in records {
        writer.write_record(record_cells(record))?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} cards to {}", records.len(), path.display());
    Ok(records.len())
}

/// Reads a file produced by `write_tsv` back into records
///
/// # Errors
///
/// `Io` when the file cannot be read; `Parse` when the header does not match
/// `COLUMNS`, a row has the wrong number of cells, or a row has no card number.
pub fn read_tsv(path: &Path) -> Result<Vec<CardRecord>> {
    let source = path.display().to_string();
    let malformed = |message: String| CardlistError::Parse {
        url: source.clone(),
        message,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(true)
        .from_reader(File::open(path)?);

    let header = reader.headers()?;
    if header.iter().ne(COLUMNS) {
        return Err(malformed(format!(
            "unexpected header '{}'",
            header.iter().collect::<Vec<_>>().join("\t")
        )));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| row_error(&source, e))?;
        let line = row.position().map_or(0, |pos| pos.line());

        let mut cells = row.iter().map(unescape_field);
        let cardno = cells.next().unwrap_or_default();
        if cardno.is_empty() {
            return Err(malformed(format!("row {} has no card number", line)));
        }

        let mut record = CardRecord::new(cardno);
        for field in CardField::all_fields() {
            let value = cells.next().unwrap_or_default();
            if !value.is_empty() {
                *record.slot_mut(field) = Some(value);
            }
        }
        record.url = cells.next().filter(|url| !url.is_empty());
        records.push(record);
    }

    Ok(records)
}

/// Reports a row with the wrong cell count by its line number
fn row_error(source: &str, error: csv::Error) -> CardlistError {
    if let csv::ErrorKind::UnequalLengths {
        pos,
        expected_len,
        len,
    } = error.kind()
    {
        return CardlistError::Parse {
            url: source.to_string(),
            message: format!(
                "row {} has {} cells, expected {}",
                pos.as_ref().map_or(0, |pos| pos.line()),
                len,
                expected_len
            ),
        };
    }
    CardlistError::Csv(error)
}

/// `RecordSink` writing a TSV file
#[derive(Debug, Clone)]
pub struct TsvWriter {
    path: PathBuf,
}

impl TsvWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for TsvWriter {
    fn write_records(&mut self, records: &[CardRecord]) -> Result<usize> {
        write_tsv(records, &self.path)
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}
