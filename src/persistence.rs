//! CSV file persistence for the endpoint store.
//!
//! The file holds one row per endpoint with six fields and no header:
//! identifier, url, method, statusOnline, frequency, failAfter.
//! Every save rewrites the whole file from the in-memory map.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::endpoint::{Endpoint, EndpointError};

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error on \"{path}\": {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error in \"{path}\": {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: \"{content}\": {source}")]
    InvalidRow {
        line: u64,
        content: String,
        #[source]
        source: EndpointError,
    },
}

/// CSV file backing an endpoint store.
#[derive(Debug, Clone)]
pub struct CsvFile {
    path: PathBuf,
}

impl CsvFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all endpoints from the file.
    ///
    /// A missing file yields an empty map. Any row that does not decode into
    /// a valid endpoint aborts the load with its line number and content.
    pub fn load(&self) -> Result<HashMap<String, Endpoint>, PersistenceError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    "Config file {} does not exist, starting with an empty store",
                    self.path.display()
                );
                return Ok(HashMap::new());
            }
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut endpoints = HashMap::new();
        for (index, row) in reader.records().enumerate() {
            let row = row.map_err(|source| PersistenceError::Csv {
                path: self.path.clone(),
                source,
            })?;
            let line = row
                .position()
                .map(|p| p.line())
                .unwrap_or(index as u64 + 1);
            let fields: Vec<&str> = row.iter().collect();

            let endpoint =
                Endpoint::from_record(&fields).map_err(|source| PersistenceError::InvalidRow {
                    line,
                    content: fields.join(","),
                    source,
                })?;

            if endpoints.contains_key(&endpoint.identifier) {
                warn!(
                    "line {}: duplicate identifier \"{}\" replaces an earlier row",
                    line, endpoint.identifier
                );
            }
            endpoints.insert(endpoint.identifier.clone(), endpoint);
        }

        info!(
            "Loaded {} endpoint(s) from {}",
            endpoints.len(),
            self.path.display()
        );
        Ok(endpoints)
    }

    /// Rewrites the whole file from `endpoints`, sorted by identifier.
    ///
    /// Rows go to a sibling temporary file that is synced to disk and then
    /// renamed over the target, so readers never observe a half-written
    /// file. On failure the temporary file is removed.
    pub fn save(&self, endpoints: &HashMap<String, Endpoint>) -> Result<(), PersistenceError> {
        let tmp_path = self.tmp_path();

        let result = self
            .write_rows(&tmp_path, endpoints)
            .and_then(|()| {
                fs::rename(&tmp_path, &self.path).map_err(|source| PersistenceError::Io {
                    path: self.path.clone(),
                    source,
                })
            });

        if let Err(e) = result {
            if tmp_path.exists() {
                if let Err(cleanup) = fs::remove_file(&tmp_path) {
                    warn!(
                        "Could not remove temporary file {}: {}",
                        tmp_path.display(),
                        cleanup
                    );
                }
            }
            return Err(e);
        }

        debug!(
            "Wrote {} endpoint(s) to {}",
            endpoints.len(),
            self.path.display()
        );
        Ok(())
    }

    fn write_rows(
        &self,
        tmp_path: &Path,
        endpoints: &HashMap<String, Endpoint>,
    ) -> Result<(), PersistenceError> {
        let csv_err = |source| PersistenceError::Csv {
            path: tmp_path.to_path_buf(),
            source,
        };
        let io_err = |source| PersistenceError::Io {
            path: tmp_path.to_path_buf(),
            source,
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(tmp_path)
            .map_err(csv_err)?;

        let mut sorted: Vec<&Endpoint> = endpoints.values().collect();
        sorted.sort_by(|a, b| a.identifier.cmp(&b.identifier));

        for endpoint in sorted {
            writer.write_record(endpoint.to_record()).map_err(csv_err)?;
        }

        let file = writer
            .into_inner()
            .map_err(|e| io_err(io::Error::new(e.error().kind(), e.error().to_string())))?;
        file.sync_all().map_err(io_err)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
