//! Archive download.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{Error, Result};

const FETCH_TIMEOUT: Duration = Duration::from_secs(45);

/// Builds the blocking HTTP client shared by the API client and the fetcher.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(format!(
            "ezwow/{} (+https://github.com/jamal-alsarraf/ezwow)",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(timeout)
        .build()
}

/// Retrieves archive bytes for a resolved URL.
pub trait ArchiveFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`ArchiveFetcher`] doing a single HTTP GET, without retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self {
            client: http_client(FETCH_TIMEOUT)?,
        })
    }
}

impl ArchiveFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let download_error = |e: reqwest::Error| Error::Download {
            url: url.to_string(),
            source: Box::new(e),
        };

        tracing::info!("Downloading {}", url);
        let resp = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(download_error)?;
        let bytes = resp.bytes().map_err(download_error)?;

        tracing::debug!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
