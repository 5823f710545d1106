//! All error types for the csv2po crate.
//!
//! Errors are split in two families: fatal ones abort the whole run before any
//! catalog is touched, per-language ones only skip the affected language.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unable to download `{url}`: {message}")]
    Fetch { url: String, message: String },

    #[error("table parse error: {0}")]
    TableParse(String),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed catalog {}:{line}: {message}", path.display())]
    CatalogDecode {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("unable to write catalog {}: {source}", path.display())]
    CatalogWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// Creates a new fetch error for `url`.
    pub fn fetch(url: impl Into<String>, message: impl ToString) -> Self {
        Error::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error stops the whole run rather than a single language.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::CatalogDecode { .. } | Error::CatalogWrite { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_configuration_error() {
        let error = Error::configuration("option `extension_name` is missing");
        assert_eq!(
            error.to_string(),
            "configuration error: option `extension_name` is missing"
        );
        assert!(error.is_fatal());
    }

    #[test]
    fn test_fetch_error() {
        let error = Error::fetch("https://example.com/sheet.csv", "HTTP 404");
        assert_eq!(
            error.to_string(),
            "unable to download `https://example.com/sheet.csv`: HTTP 404"
        );
        assert!(error.is_fatal());
    }

    #[test]
    fn test_decode_error_is_per_language() {
        let error = Error::CatalogDecode {
            path: PathBuf::from("translations/site.fr.po"),
            line: 12,
            message: "unterminated string".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "malformed catalog translations/site.fr.po:12: unterminated string"
        );
        assert!(!error.is_fatal());
    }

    #[test]
    fn test_write_error_is_per_language() {
        let error = Error::CatalogWrite {
            path: PathBuf::from("/readonly/site.de.po"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(error.to_string().contains("/readonly/site.de.po"));
        assert!(!error.is_fatal());
    }

    #[test]
    fn test_error_debug() {
        let error = Error::TableParse("missing header row".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("TableParse"));
        assert!(debug.contains("missing header row"));
    }
}
