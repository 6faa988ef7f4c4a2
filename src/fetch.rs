//! Retrieval of the upstream time-series document.
//!
//! The document is fetched fresh on every run. A local snapshot file can be
//! used instead of the remote endpoint (plain or `.gz`), which keeps report
//! runs reproducible and lets tests avoid the network.

use crate::config;
use crate::error::{ReportError, Result};
use crate::models::RawRecord;
use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Upstream document: country name -> one record per day.
pub type RawDocument = BTreeMap<String, Vec<RawRecord>>;

/// Where the time-series document comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Remote(String),
    File(PathBuf),
}

impl Default for Source {
    fn default() -> Self {
        Source::Remote(config::DATA_URL.to_string())
    }
}

/// Fetches and parses the time-series document.
pub struct Fetcher {
    pub source: Source,
    timeout: Duration,
    client: Option<Client>,
}

impl Fetcher {
    pub fn new(source: Source, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            client: None,
        }
    }

    /// Lazy HTTP client, created on first use.
    fn client(&mut self) -> Result<&Client> {
        if self.client.is_none() {
            self.client = Some(
                Client::builder()
                    .timeout(self.timeout)
                    .redirect(reqwest::redirect::Policy::limited(10))
                    .build()?,
            );
        }
        self.client
            .as_ref()
            .ok_or_else(|| ReportError::InvalidArgument("HTTP client unavailable".to_string()))
    }

    /// Fetch the whole document. Any transport or parse failure aborts the run.
    pub fn fetch(&mut self) -> Result<RawDocument> {
        let contents = match self.source.clone() {
            Source::Remote(url) => self.download(&url)?,
            Source::File(path) => read_snapshot(&path)?,
        };
        let doc: RawDocument = serde_json::from_str(&contents)?;
        if doc.is_empty() {
            return Err(ReportError::NotFound(
                "Time-series document contains no countries".to_string(),
            ));
        }
        info!(countries = doc.len(), "parsed time-series document");
        Ok(doc)
    }

    fn download(&mut self, url: &str) -> Result<String> {
        info!(url, "downloading time series");
        let client = self.client()?.clone();
        let resp = client.get(url).send()?.error_for_status()?;
        Ok(resp.text()?)
    }

    /// Drop the HTTP client, if open.
    pub fn close(&mut self) {
        self.client = None;
    }
}

/// Read a local snapshot, decompressing `.gz` files transparently.
pub fn read_snapshot(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ReportError::NotFound(format!(
            "Snapshot file {} does not exist",
            path.display()
        )));
    }
    info!(path = %path.display(), "reading time-series snapshot");

    let mut contents = String::new();
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        let file = fs::File::open(path)?;
        let mut reader = BufReader::new(GzDecoder::new(BufReader::new(file)));
        reader.read_to_string(&mut contents)?;
    } else {
        contents = fs::read_to_string(path)?;
    }
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const DOC: &str = r#"{"Norway": [{"date": "2020-1-22", "confirmed": 0, "deaths": 0, "recovered": 0}]}"#;

    #[test]
    fn reads_plain_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timeseries.json");
        fs::write(&path, DOC).unwrap();

        let mut fetcher = Fetcher::new(Source::File(path), Duration::from_secs(5));
        let doc = fetcher.fetch().unwrap();
        assert_eq!(doc["Norway"].len(), 1);
        assert_eq!(doc["Norway"][0].date, "2020-1-22");
    }

    #[test]
    fn reads_gzip_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timeseries.json.gz");
        let mut enc = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
        enc.write_all(DOC.as_bytes()).unwrap();
        enc.finish().unwrap();

        let mut fetcher = Fetcher::new(Source::File(path), Duration::from_secs(5));
        assert!(fetcher.fetch().unwrap().contains_key("Norway"));
    }

    #[test]
    fn missing_or_malformed_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut missing = Fetcher::new(
            Source::File(dir.path().join("nope.json")),
            Duration::from_secs(5),
        );
        assert!(matches!(missing.fetch(), Err(ReportError::NotFound(_))));

        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"Norway\": [").unwrap();
        let mut broken = Fetcher::new(Source::File(path), Duration::from_secs(5));
        assert!(matches!(broken.fetch(), Err(ReportError::Json(_))));
    }
}
