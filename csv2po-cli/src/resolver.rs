use std::path::{Path, PathBuf};

use csv2po::{AssetPathResolver, ExtensionType};

/// Locates themes and modules below a site root by their `<name>.info.yml` file.
#[derive(Debug, Clone)]
pub struct SiteResolver {
    root: PathBuf,
    active_theme: Option<String>,
}

impl SiteResolver {
    pub fn new(root: impl Into<PathBuf>, active_theme: Option<String>) -> Self {
        Self {
            root: root.into(),
            active_theme: active_theme.filter(|t| !t.trim().is_empty()),
        }
    }

    fn pattern(&self, kind: ExtensionType, name: &str) -> String {
        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        let name = glob::Pattern::escape(name);
        format!("{}/{}s/**/{}/{}.info.yml", root, kind, name, name)
    }
}

impl AssetPathResolver for SiteResolver {
    fn resolve(&self, kind: ExtensionType, name: &str) -> Option<PathBuf> {
        let pattern = self.pattern(kind, name);
        let mut matches: Vec<PathBuf> = match glob::glob(&pattern) {
            Ok(paths) => paths.filter_map(Result::ok).collect(),
            Err(e) => {
                tracing::warn!(pattern = %pattern, error = %e, "invalid search pattern");
                return None;
            }
        };
        // Shallowest match first, so `themes/custom/x` beats a copy nested in another asset.
        matches.sort_by_key(|p| (p.components().count(), p.clone()));
        let found = matches.first().and_then(|p| p.parent()).map(Path::to_path_buf);
        tracing::debug!(kind = %kind, name, found = ?found, "asset lookup");
        found
    }

    fn default_name(&self, kind: ExtensionType) -> Option<String> {
        match kind {
            ExtensionType::Theme => self.active_theme.clone(),
            ExtensionType::Module => None,
        }
    }
}
