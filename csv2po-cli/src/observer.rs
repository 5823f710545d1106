use std::path::Path;

use csv2po::{Error, RunStatus, SourceLocation, SyncObserver, SyncReport, WrittenCatalog};

/// Prints run progress for a human at a terminal.
///
/// Written catalog paths go to stdout, everything else to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver {
    pub quiet: bool,
}

impl ConsoleObserver {
    fn status(&self, message: String) {
        if !self.quiet {
            eprintln!("{}", message);
        }
    }
}

impl SyncObserver for ConsoleObserver {
    fn on_start(&self, source: &SourceLocation) {
        match source {
            SourceLocation::Remote { url, store_at } => self.status(format!(
                "Downloading {} to {}",
                url,
                store_at.display()
            )),
            SourceLocation::Local { path } => {
                self.status(format!("Reading {}", path.display()))
            }
        }
    }

    fn on_table_ready(&self, rows: usize, languages: &[String]) {
        if languages.is_empty() {
            self.status(format!("{} rows, no target language column found", rows));
        } else {
            self.status(format!("{} rows, languages: {}", rows, languages.join(", ")));
        }
    }

    fn on_language_start(&self, language: &str, path: &Path) {
        tracing::debug!(language, path = %path.display(), "processing language");
    }

    fn on_language_done(&self, written: &WrittenCatalog) {
        self.status(format!(
            "✔ {}: {} entries ({} new, {} updated)",
            written.language, written.entries, written.stats.created, written.stats.updated
        ));
        println!("{}", written.path.display());
    }

    fn on_language_failed(&self, language: &str, error: &Error) {
        eprintln!("✖ {}: {}", language, error);
    }

    fn on_fatal(&self, error: &Error) {
        eprintln!("Error: {}", error);
    }

    fn on_finish(&self, report: &SyncReport) {
        match report.status {
            RunStatus::EmptyTable => self.status("The table has no data rows, nothing to do".to_string()),
            RunStatus::Completed if !report.is_success() => {
                eprintln!("No catalog could be written")
            }
            RunStatus::Completed => self.status(format!(
                "{} of {} catalogs written",
                report.written.len(),
                report.languages.len()
            )),
        }
    }
}
