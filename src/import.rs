//! CSV Import
//!
//! Loads the three Witter datasets into a [`Witter`] store:
//!
//! ```text
//! users.csv    id,name,joined
//! follows.csv  follower,followee,since
//! weets.csv    id,author,text,posted
//! ```
//!
//! Load users first, then follows, then weets, so references resolve.
//! A bad row is counted and reported, never fatal. An unreadable file is.

use crate::store::{parse_timestamp, StoreError, StoreResult, User, Weet, Witter};
use std::io::Read;
use std::path::Path;

/// Errors kept in a report before the rest are summarized
const MAX_ERRORS: usize = 100;

/// CSV dataset importer
#[derive(Debug, Clone)]
pub struct CsvImporter {
    /// Whether each file starts with a header row
    has_header: bool,
    /// Errors kept per report
    max_errors: usize,
}

/// Result of importing one file
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ImportReport {
    pub rows_processed: usize,
    pub rows_accepted: usize,
    pub rows_rejected: usize,
    pub errors: Vec<String>,
}

impl ImportReport {
    fn reject(&mut self, line: u64, message: impl std::fmt::Display, max_errors: usize) {
        tracing::warn!("Rejected row at line {}: {}", line, message);
        self.rows_rejected += 1;
        if self.errors.len() < max_errors {
            self.errors
                .push(StoreError::Import {
                    line,
                    message: message.to_string(),
                }
                .to_string());
        }
    }

    fn finish(&mut self, max_errors: usize) {
        if self.rows_rejected > max_errors {
            self.errors
                .push(format!("... and {} more errors", self.rows_rejected - max_errors));
        }
    }
}

impl std::fmt::Display for ImportReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Processed: {}, Accepted: {}, Rejected: {}",
            self.rows_processed, self.rows_accepted, self.rows_rejected
        )
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvImporter {
    /// Create a new CSV importer with default settings
    pub fn new() -> Self {
        Self {
            has_header: true,
            max_errors: MAX_ERRORS,
        }
    }

    /// Set whether the CSV files have a header row
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set how many row errors each report keeps
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    fn reader<R: Read>(&self, source: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .has_headers(self.has_header)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(source)
    }

    fn open(&self, path: &Path) -> StoreResult<csv::Reader<std::fs::File>> {
        let file = std::fs::File::open(path)?;
        Ok(self.reader(file))
    }

    /// Import `id,name,joined` rows
    pub fn import_users(&self, path: &Path, store: &mut Witter) -> StoreResult<ImportReport> {
        let report = self.apply_users(self.open(path)?, store);
        tracing::info!("Imported users from {:?}: {}", path, report);
        Ok(report)
    }

    /// Import `follower,followee,since` rows
    pub fn import_follows(&self, path: &Path, store: &mut Witter) -> StoreResult<ImportReport> {
        let report = self.apply_follows(self.open(path)?, store);
        tracing::info!("Imported follows from {:?}: {}", path, report);
        Ok(report)
    }

    /// Import `id,author,text,posted` rows
    pub fn import_weets(&self, path: &Path, store: &mut Witter) -> StoreResult<ImportReport> {
        let report = self.apply_weets(self.open(path)?, store);
        tracing::info!("Imported weets from {:?}: {}", path, report);
        Ok(report)
    }

    /// Import users from a CSV string (useful for testing)
    pub fn import_users_str(&self, csv_data: &str, store: &mut Witter) -> ImportReport {
        self.apply_users(self.reader(csv_data.as_bytes()), store)
    }

    /// Import follows from a CSV string (useful for testing)
    pub fn import_follows_str(&self, csv_data: &str, store: &mut Witter) -> ImportReport {
        self.apply_follows(self.reader(csv_data.as_bytes()), store)
    }

    /// Import weets from a CSV string (useful for testing)
    pub fn import_weets_str(&self, csv_data: &str, store: &mut Witter) -> ImportReport {
        self.apply_weets(self.reader(csv_data.as_bytes()), store)
    }

    fn apply_users<R: Read>(&self, reader: csv::Reader<R>, store: &mut Witter) -> ImportReport {
        self.apply(reader, |record| {
            let user = User::new(
                field(record, 0, "id")?.parse().map_err(|e| bad("id", e))?,
                field(record, 1, "name")?,
                parse_timestamp(field(record, 2, "joined")?)?,
            );
            let id = user.id;
            if store.add_user(user) {
                Ok(())
            } else {
                Err(RowError(format!("duplicate user id {}", id)))
            }
        })
    }

    fn apply_follows<R: Read>(&self, reader: csv::Reader<R>, store: &mut Witter) -> ImportReport {
        self.apply(reader, |record| {
            let follower = field(record, 0, "follower")?
                .parse()
                .map_err(|e| bad("follower", e))?;
            let followee = field(record, 1, "followee")?
                .parse()
                .map_err(|e| bad("followee", e))?;
            let since = parse_timestamp(field(record, 2, "since")?)?;

            if store.add_follower(follower, followee, since)? {
                Ok(())
            } else {
                Err(RowError(format!("duplicate follow {} -> {}", follower, followee)))
            }
        })
    }

    fn apply_weets<R: Read>(&self, reader: csv::Reader<R>, store: &mut Witter) -> ImportReport {
        self.apply(reader, |record| {
            let weet = Weet::new(
                field(record, 0, "id")?.parse().map_err(|e| bad("id", e))?,
                field(record, 1, "author")?
                    .parse()
                    .map_err(|e| bad("author", e))?,
                field(record, 2, "text")?,
                parse_timestamp(field(record, 3, "posted")?)?,
            );
            let id = weet.id;
            if store.add_weet(weet)? {
                Ok(())
            } else {
                Err(RowError(format!("duplicate weet id {}", id)))
            }
        })
    }

    /// Feed every record to `row`, counting accepted and rejected rows
    fn apply<R, F>(&self, mut reader: csv::Reader<R>, mut row: F) -> ImportReport
    where
        R: Read,
        F: FnMut(&csv::StringRecord) -> Result<(), RowError>,
    {
        let mut report = ImportReport::default();

        for (line_num, result) in reader.records().enumerate() {
            let actual_line = if self.has_header {
                line_num as u64 + 2
            } else {
                line_num as u64 + 1
            };
            report.rows_processed += 1;

            let outcome = match result {
                Ok(record) => row(&record),
                Err(e) => Err(RowError::from(StoreError::from(e))),
            };

            match outcome {
                Ok(()) => report.rows_accepted += 1,
                Err(e) => report.reject(actual_line, e, self.max_errors),
            }
        }

        report.finish(self.max_errors);
        report
    }
}

/// Why a single row was rejected
#[derive(Debug)]
struct RowError(String);

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<StoreError> for RowError {
    fn from(err: StoreError) -> Self {
        RowError(err.to_string())
    }
}

fn field<'r>(record: &'r csv::StringRecord, index: usize, name: &str) -> Result<&'r str, RowError> {
    record
        .get(index)
        .ok_or_else(|| RowError(format!("missing {} column", name)))
}

fn bad(name: &str, err: impl std::fmt::Display) -> RowError {
    RowError(format!("invalid {}: {}", name, err))
}
