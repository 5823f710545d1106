//! Applying table records to one language's catalog.
//!
//! Every record whose source cell and language cell are both filled becomes one
//! catalog entry. How it meets the entries already in the catalog depends on the
//! [`MergeMode`]:
//!
//! * [`MergeMode::ReplaceAll`] builds a new entry per row; a later row with the same
//!   key replaces the earlier one in place.
//! * [`MergeMode::MergeUpdate`] updates the entry with the same key, or appends.
//! * [`MergeMode::MergeAppend`] always appends, duplicates included.
//!
//! Rows flagged in the `PLURAL` column hold both forms in one cell, split on the
//! configured separator. Changes of the `PAGE` label open a comment block so the
//! written catalog reads in sections.

use serde::Serialize;

use crate::{
    config::{DEFAULT_SOURCE_LANGUAGE, MergeMode, default_plural_separator},
    table::{CONTEXT_COLUMN, PAGE_COLUMN, PLURAL_COLUMN, Record, SourceTable},
    types::{Catalog, CatalogEntry, TranslationKey},
};

/// First line of a section comment block.
pub const SECTION_RULE: &str =
    "---------------------------------------------------------------------";
/// Prefix of the label line, and last line of a section comment block.
pub const SECTION_MARKER: &str = "------";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub mode: MergeMode,
    /// Separator between the singular and plural forms inside a cell.
    pub plural_separator: String,
    /// Column holding the untranslated text.
    pub source_column: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            mode: MergeMode::ReplaceAll,
            plural_separator: default_plural_separator(),
            source_column: DEFAULT_SOURCE_LANGUAGE.to_string(),
        }
    }
}

/// Counters for one synchronization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Rows with both a source and a translation.
    pub qualifying: usize,
    pub skipped: usize,
    /// Entries added to the catalog.
    pub created: usize,
    /// Entries that replaced one with the same key.
    pub updated: usize,
    pub plurals: usize,
}

/// Three comment lines announcing a new section labelled `label`.
pub fn section_comments(label: &str) -> [String; 3] {
    [
        SECTION_RULE.to_string(),
        format!(
            "{} {}",
            SECTION_MARKER,
            label.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
        ),
        SECTION_MARKER.to_string(),
    ]
}

/// Splits a plural cell pair into `(singular, plural)` source and target forms.
///
/// Only a two-form target with as many source forms qualifies; anything else,
/// including an empty separator, is not a plural.
pub fn split_plural<'a>(
    source: &'a str,
    target: &'a str,
    separator: &str,
) -> Option<((&'a str, &'a str), (&'a str, &'a str))> {
    if separator.is_empty() {
        return None;
    }
    let source_parts: Vec<&str> = source.split(separator).collect();
    let target_parts: Vec<&str> = target.split(separator).collect();
    if target_parts.len() == 2 && source_parts.len() == target_parts.len() {
        Some((
            (source_parts[0], source_parts[1]),
            (target_parts[0], target_parts[1]),
        ))
    } else {
        None
    }
}

/// Applies every qualifying record of `table` to `catalog` for `language`.
pub fn synchronize(
    catalog: &mut Catalog,
    table: &SourceTable,
    language: &str,
    options: &SyncOptions,
) -> SyncStats {
    let mut stats = SyncStats::default();
    let mut previous_label = String::new();

    for (index, record) in table.records().iter().enumerate() {
        let row = index + 2;
        let (Some(source), Some(target)) = (
            record.non_empty(&options.source_column),
            record.non_empty(language),
        ) else {
            stats.skipped += 1;
            tracing::trace!(row, language, "row has no source or translation");
            continue;
        };
        stats.qualifying += 1;

        let context = record.non_empty(CONTEXT_COLUMN);
        let mut entry = resolve_entry(catalog, options.mode, context, source);

        if let Some(label) = record.non_empty(PAGE_COLUMN) {
            if label.to_lowercase() != previous_label.to_lowercase() {
                for comment in section_comments(label) {
                    entry.add_comment(comment);
                }
                previous_label = label.to_string();
            }
        }

        let entry = apply_translation(
            entry,
            record,
            source,
            target,
            &options.plural_separator,
            row,
            &mut stats,
        );

        match options.mode {
            MergeMode::MergeAppend => {
                catalog.append(entry);
                stats.created += 1;
            }
            MergeMode::ReplaceAll | MergeMode::MergeUpdate => {
                if catalog.upsert(entry) {
                    stats.updated += 1;
                } else {
                    stats.created += 1;
                }
            }
        }
    }

    tracing::debug!(
        language,
        qualifying = stats.qualifying,
        skipped = stats.skipped,
        created = stats.created,
        updated = stats.updated,
        "catalog synchronized"
    );
    stats
}

/// Picks the entry a record writes into.
fn resolve_entry(
    catalog: &Catalog,
    mode: MergeMode,
    context: Option<&str>,
    source: &str,
) -> CatalogEntry {
    match mode {
        MergeMode::MergeUpdate => catalog
            .find(&TranslationKey::new(context, source))
            .cloned()
            .unwrap_or_else(|| CatalogEntry::new(context, source)),
        MergeMode::ReplaceAll | MergeMode::MergeAppend => CatalogEntry::new(context, source),
    }
}

/// Sets the translation, turning the entry into a plural one when the row asks for it
/// and its cells split into two forms.
fn apply_translation(
    mut entry: CatalogEntry,
    record: &Record,
    source: &str,
    target: &str,
    separator: &str,
    row: usize,
    stats: &mut SyncStats,
) -> CatalogEntry {
    if record.non_empty(PLURAL_COLUMN).is_some() {
        match split_plural(source, target, separator) {
            Some(((singular, plural), (translation, plural_translation))) => {
                let mut plural_entry = CatalogEntry::new(entry.context.as_deref(), singular);
                plural_entry.comments = std::mem::take(&mut entry.comments);
                plural_entry.set_plural(plural, translation, plural_translation);
                stats.plurals += 1;
                return plural_entry;
            }
            None => {
                tracing::debug!(row, "plural row does not split into two forms, kept as singular");
            }
        }
    }

    entry.translation = target.to_string();
    entry
}
