//! Reading the multilingual source table.
//!
//! The first row is the header: one column for the source language, one column per
//! target language and the optional `CONTEXT`, `PAGE` and `PLURAL` columns. Column
//! lookups are case-insensitive. Tables are read BOM-aware, so UTF-16 spreadsheet
//! exports work as well as plain UTF-8 ones.
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{
    error::Error,
    traits::{Parser, TableParser},
};

/// Optional column carrying the entry context (`msgctxt`).
pub const CONTEXT_COLUMN: &str = "context";
/// Optional column carrying a page/section label used to group entries.
pub const PAGE_COLUMN: &str = "page";
/// Optional column marking rows whose cells hold plural forms.
pub const PLURAL_COLUMN: &str = "plural";

/// One data row of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    cells: Vec<(String, String)>,
}

impl Record {
    /// Raw cell value of `column`.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed cell value of `column`, or `None` when absent or blank.
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Header row plus ordered records, all sharing the header's column set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    header: Vec<String>,
    records: Vec<Record>,
}

impl SourceTable {
    /// Builds a table, padding short rows with empty cells.
    ///
    /// Cells beyond the header are dropped. Column names differing only by case are
    /// kept; lookups resolve to the first of them.
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, Error> {
        let header: Vec<String> = header
            .into_iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        if header.iter().all(String::is_empty) {
            return Err(Error::TableParse("missing header row".to_string()));
        }
        for (i, name) in header.iter().enumerate() {
            if !name.is_empty() && header[..i].contains(name) {
                return Err(Error::TableParse(format!("duplicate column `{}`", name)));
            }
        }

        let mut records = Vec::with_capacity(rows.len());
        for (index, mut row) in rows.into_iter().enumerate() {
            if row.len() > header.len() {
                if row[header.len()..].iter().any(|c| !c.trim().is_empty()) {
                    tracing::warn!(
                        row = index + 2,
                        cells = row.len(),
                        columns = header.len(),
                        "row has cells beyond the header, extra cells dropped"
                    );
                }
                row.truncate(header.len());
            }
            row.resize(header.len(), String::new());
            records.push(Record {
                cells: header.iter().cloned().zip(row).collect(),
            });
        }

        Ok(Self { header, records })
    }

    /// Convenience constructor from string slices.
    pub fn from_rows(header: &[&str], rows: &[&[&str]]) -> Result<Self, Error> {
        Self::new(
            header.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    /// Parses delimited text with a header row.
    pub fn from_reader_with_delimiter<R: BufRead>(reader: R, delimiter: u8) -> Result<Self, Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::new(header, rows)
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.header.iter().any(|h| h.eq_ignore_ascii_case(column))
    }
}

impl Parser for SourceTable {
    /// Parse comma-separated text from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        Self::from_reader_with_delimiter(reader, b',')
    }

    fn to_writer<W: std::io::Write>(&self, writer: W) -> Result<(), Error> {
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.header)?;
        for record in &self.records {
            wtr.write_record(record.iter().map(|(_, v)| v))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Override default file reading to support BOM-aware decoding (UTF-16 exports).
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        CsvTableParser::default().parse(path.as_ref())
    }
}

/// [`TableParser`] for CSV and TSV files.
///
/// Without an explicit delimiter, `.tsv` and `.tab` files are split on tabs and
/// everything else on commas.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvTableParser {
    delimiter: Option<u8>,
}

impl CsvTableParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    fn delimiter_for(&self, path: &Path) -> u8 {
        self.delimiter.unwrap_or_else(|| {
            match path
                .extension()
                .and_then(|s| s.to_str())
                .map(str::to_ascii_lowercase)
                .as_deref()
            {
                Some("tsv") | Some("tab") => b'\t',
                _ => b',',
            }
        })
    }
}

impl TableParser for CsvTableParser {
    fn parse(&self, path: &Path) -> Result<SourceTable, Error> {
        let file = File::open(path).map_err(Error::Io)?;
        // Auto-detect BOM, decode to UTF-8; passthrough UTF-8
        let decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .strip_bom(true)
            .build(file);

        SourceTable::from_reader_with_delimiter(BufReader::new(decoder), self.delimiter_for(path))
    }
}
