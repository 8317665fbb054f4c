// src/fetch/remote.rs

use reqwest::blocking::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

use super::DocumentSource;
use crate::document::RawDocument;
use crate::error::{Error, Result};

/// The statistics endpoint, fetched with one bounded GET per call.
pub struct RemoteSource {
    client: Client,
    url: Url,
}

impl RemoteSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| Error::Network {
                url: url.to_string(),
                source,
            })?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    /// GET the endpoint and parse the body as JSON.
    pub fn fetch_remote(&self) -> Result<RawDocument> {
        let start = Instant::now();
        debug!(url = %self.url, "GET");
        let network = |source: reqwest::Error| Error::Network {
            url: self.url.to_string(),
            source,
        };

        let resp = self.client.get(self.url.clone()).send().map_err(network)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = resp.bytes().map_err(network)?;
        let doc = RawDocument::from_slice(&bytes, self.url.as_str())?;
        info!(url = %self.url, bytes = bytes.len(), elapsed = ?start.elapsed(), "fetched remote document");
        Ok(doc)
    }
}

impl DocumentSource for RemoteSource {
    fn key(&self) -> &str {
        self.url.as_str()
    }

    fn fetch(&self) -> Result<RawDocument> {
        self.fetch_remote()
    }
}
