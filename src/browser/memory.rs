//! In-memory documents and binaries for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::DocumentSource;
use crate::download::{BinarySource, DownloadError};

/// Serves fixed documents and byte payloads, counting every request.
///
/// Unknown URLs answer 404; URLs registered with [`failing_first`](Self::failing_first)
/// answer 503 for their first `n` requests.
#[derive(Debug, Default)]
pub(crate) struct MemorySource {
    documents: HashMap<String, String>,
    binaries: HashMap<String, Vec<u8>>,
    failures: Mutex<HashMap<String, u32>>,
    requests: Mutex<HashMap<String, usize>>,
}

impl MemorySource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_document(mut self, url: &str, html: &str) -> Self {
        self.documents.insert(url.to_string(), html.to_string());
        self
    }

    pub(crate) fn with_binary(mut self, url: &str, bytes: &[u8]) -> Self {
        self.binaries.insert(url.to_string(), bytes.to_vec());
        self
    }

    pub(crate) fn failing_first(self, url: &str, times: u32) -> Self {
        self.failures
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(url.to_string(), times);
        self
    }

    /// How many times `url` was requested.
    pub(crate) fn requests(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    fn record(&self, url: &str) -> Result<(), DownloadError> {
        *self
            .requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entry(url.to_string())
            .or_insert(0) += 1;

        let mut failures = self
            .failures
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(remaining) = failures.get_mut(url)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(DownloadError::http_status(url, 503));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn fetch_document(&self, url: &str) -> Result<String, DownloadError> {
        self.record(url)?;
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| DownloadError::http_status(url, 404))
    }
}

#[async_trait]
impl BinarySource for MemorySource {
    async fn get_binary(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        self.record(url)?;
        self.binaries
            .get(url)
            .cloned()
            .ok_or_else(|| DownloadError::http_status(url, 404))
    }
}
