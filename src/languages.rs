//! Mapping table header columns to target languages.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use serde::Serialize;
use unic_langid::LanguageIdentifier;

use crate::traits::LanguageValidityOracle;

lazy_static! {
    /// Standard language identifiers a catalog can be produced for.
    static ref STANDARD_LANGUAGES: BTreeSet<&'static str> = [
        "af", "am", "ar", "ast", "az", "be", "bg", "bn", "bo", "bs", "ca", "cs", "cy", "da",
        "de", "dz", "el", "en", "eo", "es", "et", "eu", "fa", "fi", "fil", "fo", "fr", "fy",
        "ga", "gd", "gl", "gsw-berne", "gu", "he", "hi", "hr", "ht", "hu", "hy", "id", "is",
        "it", "ja", "jv", "ka", "kk", "km", "kn", "ko", "ku", "ky", "lo", "lt", "lv", "mg",
        "mk", "ml", "mn", "mr", "ms", "my", "nb", "ne", "nl", "nn", "oc", "pa", "pl", "pt-br",
        "pt-pt", "ro", "ru", "rw", "sco", "se", "si", "sk", "sl", "sq", "sr", "sv", "sw", "ta",
        "ta-lk", "te", "th", "tr", "tt", "tyv", "ug", "uk", "ur", "vi", "zh-hans", "zh-hant",
    ]
    .into_iter()
    .collect();
}

/// Ordered, duplicate-free set of lowercase language identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LanguageSet(Vec<String>);

impl LanguageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `language` unless already present. Returns whether it was added.
    pub fn insert(&mut self, language: impl Into<String>) -> bool {
        let language = language.into();
        if self.contains(&language) {
            false
        } else {
            self.0.push(language);
            true
        }
    }

    pub fn contains(&self, language: &str) -> bool {
        self.0.iter().any(|l| l == language)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Returns the target languages present in `header`.
///
/// The source column is skipped whatever its case; every other column is lowercased and
/// kept when `oracle` accepts it. Discovery order is preserved.
pub fn discover_languages(
    header: &[String],
    source_column: &str,
    oracle: &dyn LanguageValidityOracle,
) -> LanguageSet {
    let mut languages = LanguageSet::new();
    for column in header {
        let candidate = column.trim().to_lowercase();
        if candidate.is_empty() || candidate.eq_ignore_ascii_case(source_column.trim()) {
            continue;
        }
        if oracle.is_valid(&candidate) {
            languages.insert(candidate);
        } else {
            tracing::debug!(column = %column, "column is not a recognized language");
        }
    }
    languages
}

fn normalize_language(lang: &str) -> String {
    lang.trim().replace('_', "-").to_lowercase()
}

/// Accepts identifiers found in the static list of standard languages.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownLanguages;

impl LanguageValidityOracle for KnownLanguages {
    fn is_valid(&self, candidate: &str) -> bool {
        let normalized = normalize_language(candidate);
        normalized.parse::<LanguageIdentifier>().is_ok()
            && STANDARD_LANGUAGES.contains(normalized.as_str())
    }
}

/// Accepts identifiers from a list of enabled languages, such as a site's configured ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnabledLanguages {
    enabled: BTreeSet<String>,
}

impl EnabledLanguages {
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            enabled: languages
                .into_iter()
                .map(|l| normalize_language(l.as_ref()))
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}

impl LanguageValidityOracle for EnabledLanguages {
    fn is_valid(&self, candidate: &str) -> bool {
        self.enabled.contains(&normalize_language(candidate))
    }
}
