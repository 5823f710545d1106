//! Building or loading the catalog a language is synchronized into.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::{config::MergeMode, error::Error, traits::CatalogCodec, types::Catalog};

/// Plural rule written into freshly built catalogs.
pub const DEFAULT_PLURAL_FORMS: &str = "nplurals=2; plural=(n>1);";

/// Formats a timestamp the way PO headers expect it (`2024-05-01 13:37+0000`).
pub fn format_po_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M+0000").to_string()
}

/// Returns an empty catalog carrying the standard headers.
pub fn fresh_catalog(language: &str, now: DateTime<Utc>) -> Catalog {
    let mut catalog = Catalog::new(language);
    catalog
        .headers
        .set("Language", language)
        .set("Content-Transfer-Encoding", "8bit")
        .set("Content-Type", "text/plain; charset=UTF-8")
        .set("MIME-Version", "1.0")
        .set("Plural-Forms", DEFAULT_PLURAL_FORMS)
        .set("POT-Creation-Date", format_po_date(now));
    catalog
}

/// Returns the catalog `language` is synchronized into.
///
/// Replace mode ignores whatever is at `path`. Merge modes decode the existing file,
/// or start fresh when there is none. The revision date is refreshed either way.
pub fn load_catalog(
    codec: &dyn CatalogCodec,
    language: &str,
    path: &Path,
    mode: MergeMode,
    now: DateTime<Utc>,
) -> Result<Catalog, Error> {
    let mut catalog = if mode.loads_existing() && path.exists() {
        tracing::debug!(path = %path.display(), "merging into existing catalog");
        let mut catalog = codec.decode(path)?;
        catalog.language = language.to_string();
        catalog
    } else {
        fresh_catalog(language, now)
    };

    catalog.headers.set("PO-Revision-Date", format_po_date(now));
    Ok(catalog)
}
