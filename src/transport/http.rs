use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::{FreshetError, Result};
use crate::transport::{FetchResponse, Transport, Validators};

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("freshet/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn conditional_headers(validators: &Validators) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Some(etag) = &validators.etag {
        if let Ok(value) = HeaderValue::from_str(etag) {
            headers.insert(IF_NONE_MATCH, value);
        }
    }

    if let Some(last_modified) = &validators.last_modified {
        if let Ok(value) = HeaderValue::from_str(last_modified) {
            headers.insert(IF_MODIFIED_SINCE, value);
        }
    }

    headers
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &Url, validators: &Validators) -> Result<FetchResponse> {
        let response = self
            .client
            .get(url.clone())
            .headers(conditional_headers(validators))
            .send()
            .await
            .map_err(|e| FreshetError::network_fetch(url, e.to_string()))?;

        if response.status() == StatusCode::NOT_MODIFIED {
            return Ok(FetchResponse::NotModified);
        }

        if let Err(e) = response.error_for_status_ref() {
            return Err(FreshetError::network_fetch(url, e.to_string()));
        }

        let etag = response
            .headers()
            .get("etag")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let last_modified = response
            .headers()
            .get("last-modified")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = response
            .text()
            .await
            .map_err(|e| FreshetError::network_fetch(url, e.to_string()))?;

        Ok(FetchResponse::Content {
            body,
            etag,
            last_modified,
        })
    }
}
