// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! HTTP page fetcher.

use std::time::Duration;

use layered::Service;
use tally_store::Error;

/// How long a request may take end to end, unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A [`PageFetcher`](crate::PageFetcher) that performs an HTTP GET and returns the body text.
///
/// The status code is not inspected: an error page is returned like any other body.
/// Transport failures and timeouts fail with [`ErrorKind::Fetch`](crate::ErrorKind::Fetch).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with default settings.
    ///
    /// # Errors
    ///
    /// Fails with a fetch error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    /// Creates a builder for a fetcher.
    #[must_use]
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder {
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Service<String> for HttpFetcher {
    type Out = Result<String, Error>;

    async fn execute(&self, url: String) -> Self::Out {
        let response = self.client.get(url).send().await.map_err(Error::fetch)?;
        tracing::trace!(status = response.status().as_u16(), "page fetched");
        response.text().await.map_err(Error::fetch)
    }
}

/// Builder for [`HttpFetcher`].
#[derive(Debug)]
pub struct HttpFetcherBuilder {
    timeout: Duration,
}

impl HttpFetcherBuilder {
    /// Sets the end-to-end timeout of a single request.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the fetcher.
    ///
    /// # Errors
    ///
    /// Fails with a fetch error if the HTTP client cannot be initialized.
    pub fn build(self) -> Result<HttpFetcher, Error> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(Error::fetch)?;
        Ok(HttpFetcher { client })
    }
}
