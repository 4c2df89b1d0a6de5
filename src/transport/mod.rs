pub mod http;

use async_trait::async_trait;
use url::Url;

use crate::error::Result;

/// Cache validators captured from a previous successful fetch, replayed as
/// conditional request headers on the next unforced refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validators {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

impl Validators {
    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }
}

#[derive(Debug, Clone)]
pub enum FetchResponse {
    /// New content retrieved successfully.
    Content {
        body: String,
        etag: Option<String>,
        last_modified: Option<String>,
    },
    /// Content not modified since the supplied validators (HTTP 304).
    NotModified,
}

/// The network-fetch capability a resource depends on. Implementations issue
/// a single GET per call; retry policy belongs to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &Url, validators: &Validators) -> Result<FetchResponse>;
}
