use crate::{
    formats::PoCodec,
    languages::KnownLanguages,
    orchestrator::Orchestrator,
    table::CsvTableParser,
    traits::{
        AssetPathResolver, CatalogCodec, LanguageValidityOracle, NoopObserver, SyncObserver,
        TableFetcher, TableParser,
    },
};

/// Builder for an [`Orchestrator`] with a fluent interface.
///
/// Only the path resolver is mandatory. Everything else falls back to the
/// standard collaborators: CSV tables, PO catalogs, the static language list
/// and no status reporting. Without a fetcher, remote sources are rejected.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::PathBuf;
/// use csv2po::{AssetPathResolver, ExtensionType, Orchestrator, SyncConfig};
///
/// struct Site;
///
/// impl AssetPathResolver for Site {
///     fn resolve(&self, kind: ExtensionType, name: &str) -> Option<PathBuf> {
///         Some(PathBuf::from(format!("web/{}s/custom/{}", kind, name)))
///     }
/// }
///
/// let orchestrator = Orchestrator::builder(Site).build();
/// let config = SyncConfig {
///     extension_name: Some("olivero".to_string()),
///     ..SyncConfig::default()
/// };
/// let report = orchestrator.run(&config)?;
/// println!("{} catalogs written", report.written.len());
/// # Ok::<(), csv2po::Error>(())
/// ```
pub struct OrchestratorBuilder {
    fetcher: Option<Box<dyn TableFetcher>>,
    parser: Box<dyn TableParser>,
    codec: Box<dyn CatalogCodec>,
    known_languages: Box<dyn LanguageValidityOracle>,
    enabled_languages: Option<Box<dyn LanguageValidityOracle>>,
    resolver: Box<dyn AssetPathResolver>,
    observer: Box<dyn SyncObserver>,
}

impl OrchestratorBuilder {
    /// Creates a builder around the resolver that locates themes and modules.
    pub fn new(resolver: impl AssetPathResolver + 'static) -> Self {
        Self {
            fetcher: None,
            parser: Box::new(CsvTableParser::default()),
            codec: Box::new(PoCodec),
            known_languages: Box::new(KnownLanguages),
            enabled_languages: None,
            resolver: Box::new(resolver),
            observer: Box::new(NoopObserver),
        }
    }

    /// Sets the client used to download remote tables.
    pub fn with_fetcher(mut self, fetcher: impl TableFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    pub fn with_parser(mut self, parser: impl TableParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn with_codec(mut self, codec: impl CatalogCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    /// Replaces the static list consulted when enabled-language checking is off.
    pub fn with_known_languages(mut self, oracle: impl LanguageValidityOracle + 'static) -> Self {
        self.known_languages = Box::new(oracle);
        self
    }

    /// Sets the oracle consulted when enabled-language checking is on.
    ///
    /// Takes precedence over `enabled_languages` in the run configuration.
    pub fn with_enabled_languages(
        mut self,
        oracle: impl LanguageValidityOracle + 'static,
    ) -> Self {
        self.enabled_languages = Some(Box::new(oracle));
        self
    }

    pub fn with_observer(mut self, observer: impl SyncObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Consumes the builder and returns the constructed [`Orchestrator`].
    pub fn build(self) -> Orchestrator {
        Orchestrator {
            fetcher: self.fetcher,
            parser: self.parser,
            codec: self.codec,
            known_languages: self.known_languages,
            enabled_languages: self.enabled_languages,
            resolver: self.resolver,
            observer: self.observer,
        }
    }
}
