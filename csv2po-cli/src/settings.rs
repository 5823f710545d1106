use std::{fs, path::PathBuf};

use clap::Args;
use csv2po::{Error, ExtensionType, SyncConfig};

/// Options of the `convert` subcommand. Every option overrides the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConvertArgs {
    /// Table to convert: an http(s) URL to download, or a local CSV/TSV file
    pub source: Option<String>,

    /// TOML file with default options
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Site root that holds the `themes/` and `modules/` directories
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Theme used when no extension name is given
    #[arg(long)]
    pub active_theme: Option<String>,

    /// Kind of asset the catalogs belong to (theme or module)
    #[arg(short = 't', long)]
    pub extension_type: Option<ExtensionType>,

    /// Machine name of the theme or module
    #[arg(short = 'n', long)]
    pub extension_name: Option<String>,

    /// Directory below the asset where catalogs are written
    #[arg(long)]
    pub translations_dir: Option<String>,

    /// File name a downloaded table is stored under
    #[arg(long)]
    pub output_filename: Option<String>,

    /// Column holding the untranslated text
    #[arg(long)]
    pub source_language: Option<String>,

    /// Merge into existing catalogs instead of rebuilding them
    #[arg(long)]
    pub merge: bool,

    /// Rebuild catalogs from the table, even when the config file merges
    #[arg(long, conflicts_with = "merge")]
    pub replace_all: bool,

    /// When merging, update entries with the same key instead of appending
    #[arg(long)]
    pub allow_update: bool,

    /// Separator between the singular and plural forms of a cell
    #[arg(long)]
    pub plural_separator: Option<String>,

    /// Comma-separated languages enabled on the site
    #[arg(long, value_delimiter = ',')]
    pub enabled_languages: Vec<String>,

    /// Accept any known language instead of the enabled ones
    #[arg(long, conflicts_with = "enabled_languages")]
    pub known_languages: bool,

    /// Process languages in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Write the run report as JSON to this file
    #[arg(long)]
    pub report_json: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print written catalog paths and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl ConvertArgs {
    /// Builds the run configuration: config file first, then command line overrides.
    pub fn to_config(&self) -> Result<SyncConfig, Error> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => SyncConfig::default(),
        };

        if let Some(source) = self.source.as_deref().map(str::trim) {
            if is_url(source) {
                config.remote_source_url = Some(source.to_string());
            } else {
                config.remote_source_url = None;
                config.source_path = Some(PathBuf::from(source));
            }
        }
        if let Some(kind) = self.extension_type {
            config.extension_type = kind;
        }
        if let Some(name) = &self.extension_name {
            config.extension_name = Some(name.clone());
        }
        if let Some(dir) = &self.translations_dir {
            config.translations_directory_name = dir.clone();
        }
        if let Some(filename) = &self.output_filename {
            config.output_filename = filename.clone();
        }
        if let Some(language) = &self.source_language {
            config.source_language = language.clone();
        }
        if self.merge {
            config.replace_all = false;
        }
        if self.replace_all {
            config.replace_all = true;
        }
        if self.allow_update {
            config.allow_update = true;
        }
        if let Some(separator) = &self.plural_separator {
            config.plural_value_separator = unescape_separator(separator);
        }
        if !self.enabled_languages.is_empty() {
            config.check_enabled_languages = true;
            config.enabled_languages = self.enabled_languages.clone();
        }
        if self.known_languages {
            config.check_enabled_languages = false;
        }
        if self.parallel {
            config.parallel = true;
        }
        Ok(config)
    }
}

/// Reads a [`SyncConfig`] from a TOML file. Missing options keep their defaults.
pub fn load_config(path: &std::path::Path) -> Result<SyncConfig, Error> {
    let text = fs::read_to_string(path).map_err(|e| {
        Error::configuration(format!("unable to read {}: {}", path.display(), e))
    })?;
    toml::from_str(&text)
        .map_err(|e| Error::configuration(format!("invalid config {}: {}", path.display(), e)))
}

fn is_url(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Lets `\n`, `\r\n` and `\t` be typed literally on the command line.
fn unescape_separator(separator: &str) -> String {
    separator
        .replace("\\r", "\r")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
}
