//! Core types for csv2po.
//! The PO codec decodes into these; the synchronizer mutates them; the codec encodes them back.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Identifies an entry inside one catalog.
///
/// An empty context is the same bucket as no context at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct TranslationKey {
    pub context: Option<String>,
    pub source: String,
}

impl TranslationKey {
    pub fn new(context: Option<&str>, source: impl Into<String>) -> Self {
        Self {
            context: normalize_context(context),
            source: source.into(),
        }
    }
}

impl Display for TranslationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{}|{}", context, self.source),
            None => write!(f, "{}", self.source),
        }
    }
}

fn normalize_context(context: Option<&str>) -> Option<String> {
    context.filter(|c| !c.is_empty()).map(str::to_string)
}

/// Ordered `Key: Value` metadata found in the header entry of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing an existing header in place (keys compare
    /// case-insensitively) or appending a new one.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((key.to_string(), value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A single translatable unit of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogEntry {
    /// Disambiguating context (`msgctxt`).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub context: Option<String>,

    /// Untranslated source text (`msgid`).
    pub singular: String,

    /// Untranslated plural source text (`msgid_plural`).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub plural: Option<String>,

    /// Singular (or only) translated form.
    pub translation: String,

    /// Plural translated form, set iff `plural` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub plural_translation: Option<String>,

    /// `msgstr[2..]` of languages with more than two plural forms.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub extra_plural_translations: Vec<String>,

    /// Translator comments (`# `).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub comments: Vec<String>,

    /// Extracted comments (`#.`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub extracted_comments: Vec<String>,

    /// Source references (`#:`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub references: Vec<String>,

    /// Flags such as `fuzzy` (`#,`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub flags: Vec<String>,

    /// Obsolete entries are written with the `#~` prefix.
    #[serde(default)]
    pub obsolete: bool,
}

impl CatalogEntry {
    pub fn new(context: Option<&str>, singular: impl Into<String>) -> Self {
        Self {
            context: normalize_context(context),
            singular: singular.into(),
            ..Default::default()
        }
    }

    pub fn key(&self) -> TranslationKey {
        TranslationKey::new(self.context.as_deref(), self.singular.clone())
    }

    pub fn is_plural(&self) -> bool {
        self.plural.is_some()
    }

    /// Turns this entry into a two-form plural entry.
    pub fn set_plural(
        &mut self,
        plural: impl Into<String>,
        translation: impl Into<String>,
        plural_translation: impl Into<String>,
    ) {
        self.plural = Some(plural.into());
        self.translation = translation.into();
        self.plural_translation = Some(plural_translation.into());
    }

    /// Adds a translator comment unless the same line is already attached.
    pub fn add_comment(&mut self, comment: impl Into<String>) {
        let comment = comment.into();
        if !self.comments.contains(&comment) {
            self.comments.push(comment);
        }
    }
}

impl Display for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CatalogEntry {{ key: {}, translation: {} }}",
            self.key(),
            self.translation
        )
    }
}

/// One language's translation file: headers plus ordered entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Catalog {
    /// Lowercase language identifier (e.g. "fr").
    pub language: String,

    pub headers: Headers,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the position of the first entry with `key`.
    pub fn position(&self, key: &TranslationKey) -> Option<usize> {
        self.entries.iter().position(|e| {
            e.context.as_deref() == key.context.as_deref() && e.singular == key.source
        })
    }

    pub fn find(&self, key: &TranslationKey) -> Option<&CatalogEntry> {
        self.position(key).map(|i| &self.entries[i])
    }

    /// Pushes `entry` after the existing ones, even when its key is already present.
    pub fn append(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    /// Replaces the first entry sharing `entry`'s key in place, or appends it.
    ///
    /// Returns `true` when an existing entry was replaced.
    pub fn upsert(&mut self, entry: CatalogEntry) -> bool {
        match self.position(&entry.key()) {
            Some(i) => {
                self.entries[i] = entry;
                true
            }
            None => {
                self.entries.push(entry);
                false
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = TranslationKey> + '_ {
        self.entries.iter().map(CatalogEntry::key)
    }
}
