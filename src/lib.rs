//! Synchronize translation tables into gettext PO catalogs.
//!
//! A table (CSV or TSV, downloaded or local) holds one row per source string and one
//! column per language. Each run writes one `<extension>.<language>.po` catalog per
//! language column, either rebuilt from scratch or merged into the existing file.
//! Everything runs through the [`Orchestrator`] and its collaborator traits.

#![forbid(unsafe_code)]

pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod formats;
pub mod languages;
pub mod orchestrator;
pub mod synchronizer;
pub mod table;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    builder::OrchestratorBuilder,
    config::{ExtensionType, MergeMode, SourceLocation, SyncConfig, SyncPlan},
    error::Error,
    formats::PoCodec,
    languages::{EnabledLanguages, KnownLanguages, LanguageSet, discover_languages},
    orchestrator::{LanguageFailure, Orchestrator, RunStatus, SyncReport, WrittenCatalog},
    synchronizer::{SyncOptions, SyncStats, synchronize},
    table::{CsvTableParser, Record, SourceTable},
    traits::{
        AssetPathResolver, CatalogCodec, LanguageValidityOracle, NoopObserver, Parser,
        SyncObserver, TableFetcher, TableParser,
    },
    types::{Catalog, CatalogEntry, Headers, TranslationKey},
};
