//! Seams between the synchronization core and the outside world.
//!
//! The orchestrator receives every collaborator explicitly; nothing in the core
//! reaches for global state.

use std::path::{Path, PathBuf};

use crate::{
    config::{ExtensionType, SourceLocation},
    error::Error,
    orchestrator::{SyncReport, WrittenCatalog},
    table::SourceTable,
    types::Catalog,
};

pub trait Parser {
    /// Parse from any reader.
    fn from_reader<R: std::io::BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = std::fs::File::open(path).map_err(Error::Io)?;
        let reader = std::io::BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: std::io::Write>(&self, writer: W) -> Result<(), Error>;

    /// Write to file path.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        self.to_writer(writer)
    }
}

/// Downloads the raw bytes of a remote table.
pub trait TableFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, Error>;
}

/// Turns a local file into a [`SourceTable`].
pub trait TableParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<SourceTable, Error>;
}

/// Reads and writes catalogs in their on-disk format.
pub trait CatalogCodec: Send + Sync {
    fn decode(&self, path: &Path) -> Result<Catalog, Error>;

    /// Fully overwrites `path`.
    fn encode(&self, catalog: &Catalog, path: &Path) -> Result<(), Error>;
}

/// Answers whether a lowercase column name is a language worth producing a catalog for.
pub trait LanguageValidityOracle: Send + Sync {
    fn is_valid(&self, candidate: &str) -> bool;
}

/// Locates the base directory of a theme or module.
pub trait AssetPathResolver: Send + Sync {
    fn resolve(&self, kind: ExtensionType, name: &str) -> Option<PathBuf>;

    /// Name used when none is configured (the active theme, usually).
    fn default_name(&self, _kind: ExtensionType) -> Option<String> {
        None
    }
}

/// Lifecycle hooks for user-facing status reporting.
#[allow(unused_variables)]
pub trait SyncObserver: Send + Sync {
    fn on_start(&self, source: &SourceLocation) {}

    fn on_table_ready(&self, rows: usize, languages: &[String]) {}

    fn on_language_start(&self, language: &str, path: &Path) {}

    fn on_language_done(&self, written: &WrittenCatalog) {}

    fn on_language_failed(&self, language: &str, error: &Error) {}

    fn on_fatal(&self, error: &Error) {}

    fn on_finish(&self, report: &SyncReport) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}
