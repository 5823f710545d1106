//! End-to-end run: obtain the table, discover languages, write one catalog each.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    builder::OrchestratorBuilder,
    catalog::load_catalog,
    config::{SourceLocation, SyncConfig, SyncPlan},
    error::Error,
    languages::{EnabledLanguages, LanguageSet, discover_languages},
    synchronizer::{SyncOptions, SyncStats, synchronize},
    table::SourceTable,
    traits::{
        AssetPathResolver, CatalogCodec, LanguageValidityOracle, SyncObserver, TableFetcher,
        TableParser,
    },
};

/// How a run that did not fail outright ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    /// The table had a header but no data rows; nothing was written.
    EmptyTable,
}

/// A catalog that was written successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenCatalog {
    pub language: String,
    pub path: PathBuf,
    /// Entries in the written catalog, the header excluded.
    pub entries: usize,
    pub stats: SyncStats,
}

/// A language whose catalog could not be loaded or written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageFailure {
    pub language: String,
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of [`Orchestrator::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub status: RunStatus,
    pub source: SourceLocation,
    /// Data rows in the table.
    pub rows: usize,
    /// Languages discovered in the table header, in column order.
    pub languages: LanguageSet,
    pub written: Vec<WrittenCatalog>,
    pub failures: Vec<LanguageFailure>,
}

impl SyncReport {
    /// False when languages were discovered but none of them was written.
    pub fn is_success(&self) -> bool {
        self.languages.is_empty() || !self.written.is_empty()
    }
}

/// Drives one synchronization run over its collaborators.
///
/// Built with [`Orchestrator::builder`]. The orchestrator holds no per-run state, so
/// one instance can run any number of configurations.
pub struct Orchestrator {
    pub(crate) fetcher: Option<Box<dyn TableFetcher>>,
    pub(crate) parser: Box<dyn TableParser>,
    pub(crate) codec: Box<dyn CatalogCodec>,
    pub(crate) known_languages: Box<dyn LanguageValidityOracle>,
    pub(crate) enabled_languages: Option<Box<dyn LanguageValidityOracle>>,
    pub(crate) resolver: Box<dyn AssetPathResolver>,
    pub(crate) observer: Box<dyn SyncObserver>,
}

impl Orchestrator {
    pub fn builder(resolver: impl AssetPathResolver + 'static) -> OrchestratorBuilder {
        OrchestratorBuilder::new(resolver)
    }

    /// Runs a full synchronization for `config`.
    ///
    /// Returns `Err` only for fatal errors, before any catalog is touched. Failures of
    /// individual languages are collected in the report instead.
    pub fn run(&self, config: &SyncConfig) -> Result<SyncReport, Error> {
        let plan = config
            .resolve(self.resolver.as_ref())
            .map_err(|e| self.fatal(e))?;
        self.run_plan(&plan)
    }

    /// Runs a synchronization for an already resolved plan.
    pub fn run_plan(&self, plan: &SyncPlan) -> Result<SyncReport, Error> {
        let now = Utc::now();
        tracing::info!(source = %plan.source, mode = ?plan.mode, "starting synchronization");
        self.observer.on_start(&plan.source);

        let table_path = self.obtain_table(&plan.source).map_err(|e| self.fatal(e))?;
        let table = self.parse_table(&table_path).map_err(|e| self.fatal(e))?;

        if table.is_empty() {
            tracing::warn!(path = %table_path.display(), "table has no data rows");
            let report = SyncReport {
                status: RunStatus::EmptyTable,
                source: plan.source.clone(),
                rows: 0,
                languages: LanguageSet::new(),
                written: Vec::new(),
                failures: Vec::new(),
            };
            self.observer.on_finish(&report);
            return Ok(report);
        }

        let languages = self.discover(plan, &table);
        if languages.is_empty() {
            tracing::warn!(columns = ?table.header(), "no target language found in the table header");
        }
        self.observer.on_table_ready(table.len(), languages.as_slice());

        if !languages.is_empty() {
            fs::create_dir_all(&plan.output_dir).map_err(|e| self.fatal(Error::Io(e)))?;
        }

        let options = plan.sync_options();
        let process = |language: &String| {
            let path = plan.catalog_path(language);
            let outcome = self.process_language(language, &path, &table, &options, now);
            (language.clone(), path, outcome)
        };
        let outcomes: Vec<_> = if plan.parallel {
            languages.as_slice().par_iter().map(process).collect()
        } else {
            languages.as_slice().iter().map(process).collect()
        };

        let mut written = Vec::new();
        let mut failures = Vec::new();
        for (language, path, outcome) in outcomes {
            match outcome {
                Ok(catalog) => written.push(catalog),
                Err(error) => failures.push(LanguageFailure {
                    language,
                    path,
                    error: error.to_string(),
                }),
            }
        }

        let report = SyncReport {
            status: RunStatus::Completed,
            source: plan.source.clone(),
            rows: table.len(),
            languages,
            written,
            failures,
        };
        tracing::info!(
            written = report.written.len(),
            failed = report.failures.len(),
            "synchronization finished"
        );
        self.observer.on_finish(&report);
        Ok(report)
    }

    fn fatal(&self, error: Error) -> Error {
        tracing::error!(%error, "synchronization aborted");
        self.observer.on_fatal(&error);
        error
    }

    /// Returns the local path of the table, downloading it first when remote.
    fn obtain_table(&self, source: &SourceLocation) -> Result<PathBuf, Error> {
        if let SourceLocation::Remote { url, store_at } = source {
            let fetcher = self.fetcher.as_deref().ok_or_else(|| {
                Error::configuration("a remote table is configured but no fetcher is available")
            })?;
            let bytes = fetcher.fetch(url).map_err(|e| match e {
                Error::Fetch { .. } => e,
                other => Error::fetch(url, other),
            })?;
            tracing::debug!(url = %url, bytes = bytes.len(), "table downloaded");

            let store = |e: std::io::Error| {
                Error::fetch(
                    url,
                    format!("unable to store the table at {}: {}", store_at.display(), e),
                )
            };
            if let Some(parent) = store_at.parent() {
                fs::create_dir_all(parent).map_err(store)?;
            }
            fs::write(store_at, bytes).map_err(store)?;
        }
        Ok(source.local_path().to_path_buf())
    }

    fn parse_table(&self, path: &Path) -> Result<SourceTable, Error> {
        self.parser.parse(path).map_err(|e| match e {
            Error::TableParse(_) | Error::Csv(_) => e,
            other => Error::TableParse(format!("unable to read {}: {}", path.display(), other)),
        })
    }

    fn discover(&self, plan: &SyncPlan, table: &SourceTable) -> LanguageSet {
        if !plan.check_enabled_languages {
            return discover_languages(
                table.header(),
                &plan.source_language,
                self.known_languages.as_ref(),
            );
        }
        if let Some(oracle) = &self.enabled_languages {
            return discover_languages(table.header(), &plan.source_language, oracle.as_ref());
        }

        let enabled = EnabledLanguages::new(&plan.enabled_languages);
        if enabled.is_empty() {
            tracing::debug!("no enabled languages configured, using the known language list");
            discover_languages(
                table.header(),
                &plan.source_language,
                self.known_languages.as_ref(),
            )
        } else {
            discover_languages(table.header(), &plan.source_language, &enabled)
        }
    }

    fn process_language(
        &self,
        language: &str,
        path: &Path,
        table: &SourceTable,
        options: &SyncOptions,
        now: DateTime<Utc>,
    ) -> Result<WrittenCatalog, Error> {
        self.observer.on_language_start(language, path);

        let outcome = load_catalog(self.codec.as_ref(), language, path, options.mode, now)
            .and_then(|mut catalog| {
                let stats = synchronize(&mut catalog, table, language, options);
                self.codec.encode(&catalog, path)?;
                Ok(WrittenCatalog {
                    language: language.to_string(),
                    path: path.to_path_buf(),
                    entries: catalog.len(),
                    stats,
                })
            });

        match &outcome {
            Ok(written) => {
                tracing::info!(
                    language,
                    path = %path.display(),
                    entries = written.entries,
                    created = written.stats.created,
                    updated = written.stats.updated,
                    "catalog written"
                );
                self.observer.on_language_done(written);
            }
            Err(error) => {
                tracing::warn!(language, path = %path.display(), %error, "language failed");
                self.observer.on_language_failed(language, error);
            }
        }
        outcome
    }
}
