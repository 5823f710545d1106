//! Run configuration.
//!
//! [`SyncConfig`] is what users write (TOML file, CLI flags); it is resolved once
//! into an immutable [`SyncPlan`] that the rest of the pipeline consumes.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{error::Error, synchronizer::SyncOptions, traits::AssetPathResolver};

pub const DEFAULT_TRANSLATIONS_DIRECTORY: &str = "translations";
pub const DEFAULT_OUTPUT_FILENAME: &str = "translations.csv";
pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";

/// Line separator of the current platform, used to split plural cells.
pub fn default_plural_separator() -> String {
    if cfg!(windows) { "\r\n" } else { "\n" }.to_string()
}

/// Kind of asset the catalogs belong to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionType {
    #[default]
    Theme,
    Module,
}

impl FromStr for ExtensionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "theme" => Ok(ExtensionType::Theme),
            "module" => Ok(ExtensionType::Module),
            _ => Err(format!("Unknown extension type: {}", s)),
        }
    }
}

impl Display for ExtensionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtensionType::Theme => write!(f, "theme"),
            ExtensionType::Module => write!(f, "module"),
        }
    }
}

/// How incoming rows meet an existing catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Rebuild the catalog from nothing.
    ReplaceAll,
    /// Load the existing catalog and update entries whose key matches.
    MergeUpdate,
    /// Load the existing catalog and append every row as a new entry.
    MergeAppend,
}

impl MergeMode {
    pub fn from_flags(replace_all: bool, allow_update: bool) -> Self {
        match (replace_all, allow_update) {
            (true, _) => MergeMode::ReplaceAll,
            (false, true) => MergeMode::MergeUpdate,
            (false, false) => MergeMode::MergeAppend,
        }
    }

    pub fn loads_existing(&self) -> bool {
        !matches!(self, MergeMode::ReplaceAll)
    }
}

/// Where the table comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceLocation {
    /// Downloaded from `url`, stored verbatim at `store_at` before parsing.
    Remote { url: String, store_at: PathBuf },
    Local { path: PathBuf },
}

impl SourceLocation {
    /// Path the table is parsed from.
    pub fn local_path(&self) -> &Path {
        match self {
            SourceLocation::Remote { store_at, .. } => store_at,
            SourceLocation::Local { path } => path,
        }
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceLocation::Remote { url, .. } => write!(f, "{}", url),
            SourceLocation::Local { path } => write!(f, "{}", path.display()),
        }
    }
}

/// User-facing options, as read from a config file or the command line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    pub extension_type: ExtensionType,
    /// Theme or module machine name; required for modules.
    pub extension_name: Option<String>,
    pub translations_directory_name: String,
    /// Table to download before converting.
    pub remote_source_url: Option<String>,
    /// Local table used when no remote URL is configured.
    pub source_path: Option<PathBuf>,
    /// File name the downloaded table is stored under.
    pub output_filename: String,
    /// Column holding the untranslated text.
    pub source_language: String,
    pub replace_all: bool,
    pub allow_update: bool,
    pub plural_value_separator: String,
    /// Use the enabled-languages list instead of the static list of known languages.
    pub check_enabled_languages: bool,
    pub enabled_languages: Vec<String>,
    pub parallel: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            extension_type: ExtensionType::Theme,
            extension_name: None,
            translations_directory_name: DEFAULT_TRANSLATIONS_DIRECTORY.to_string(),
            remote_source_url: None,
            source_path: None,
            output_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
            source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
            replace_all: true,
            allow_update: false,
            plural_value_separator: default_plural_separator(),
            check_enabled_languages: true,
            enabled_languages: Vec::new(),
            parallel: false,
        }
    }
}

impl SyncConfig {
    pub fn merge_mode(&self) -> MergeMode {
        MergeMode::from_flags(self.replace_all, self.allow_update)
    }

    /// True when `allow_update` is set but has no effect because catalogs are rebuilt.
    pub fn ignores_allow_update(&self) -> bool {
        self.replace_all && self.allow_update
    }

    /// Validates the options and resolves every path the run needs.
    pub fn resolve(&self, resolver: &dyn AssetPathResolver) -> Result<SyncPlan, Error> {
        let extension_name = match non_empty(self.extension_name.as_deref()) {
            Some(name) => name.to_string(),
            None => match self.extension_type {
                ExtensionType::Module => {
                    return Err(Error::configuration(
                        "option `extension_name` is missing or misspelled",
                    ));
                }
                ExtensionType::Theme => resolver
                    .default_name(ExtensionType::Theme)
                    .ok_or_else(|| {
                        Error::configuration(
                            "option `extension_name` is missing and no active theme is known",
                        )
                    })?,
            },
        };

        let base = resolver
            .resolve(self.extension_type, &extension_name)
            .ok_or_else(|| {
                Error::configuration(format!(
                    "unable to locate {} `{}`",
                    self.extension_type, extension_name
                ))
            })?;
        let output_dir = base.join(&self.translations_directory_name);
        let stored_table = output_dir.join(&self.output_filename);

        let source = if let Some(url) = non_empty(self.remote_source_url.as_deref()) {
            SourceLocation::Remote {
                url: url.to_string(),
                store_at: stored_table,
            }
        } else if let Some(path) = &self.source_path {
            if !path.is_file() {
                return Err(Error::configuration(format!(
                    "source table {} does not exist",
                    path.display()
                )));
            }
            SourceLocation::Local { path: path.clone() }
        } else if stored_table.is_file() {
            SourceLocation::Local { path: stored_table }
        } else {
            return Err(Error::configuration(
                "option `remote_source_url` is missing and no local table was found",
            ));
        };

        let source_language = self.source_language.trim().to_lowercase();
        if source_language.is_empty() {
            return Err(Error::configuration("option `source_language` is empty"));
        }
        if self.ignores_allow_update() {
            tracing::warn!("option `allow_update` has no effect while `replace_all` is on");
        }

        Ok(SyncPlan {
            extension_type: self.extension_type,
            extension_name,
            output_dir,
            source,
            source_language,
            mode: self.merge_mode(),
            plural_separator: self.plural_value_separator.clone(),
            check_enabled_languages: self.check_enabled_languages,
            enabled_languages: self.enabled_languages.clone(),
            parallel: self.parallel,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Fully resolved, immutable configuration of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub extension_type: ExtensionType,
    pub extension_name: String,
    /// Directory the catalogs are written to.
    pub output_dir: PathBuf,
    pub source: SourceLocation,
    pub source_language: String,
    pub mode: MergeMode,
    pub plural_separator: String,
    pub check_enabled_languages: bool,
    pub enabled_languages: Vec<String>,
    pub parallel: bool,
}

impl SyncPlan {
    /// `<output_dir>/<extension_name>.<language>.po`
    pub fn catalog_path(&self, language: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}.po", self.extension_name, language))
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            mode: self.mode,
            plural_separator: self.plural_separator.clone(),
            source_column: self.source_language.clone(),
        }
    }
}
