use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

/// Stable namespacing string distinguishing this crate's errors from other
/// subsystems'.
pub const ERROR_DOMAIN: &str = "freshet.refreshable-resource";

/// Coarse classification of a [`FreshetError`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    FileRead,
    NetworkFetch,
    Watch,
}

/// Errors produced while refreshing or monitoring a resource.
///
/// Underlying causes (I/O, transport) are flattened into message text so the
/// error stays `Clone`-able; the resource retains the last error for pollers
/// and hands out copies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FreshetError {
    #[error("invalid resource URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to read {path}: {message}")]
    FileRead { path: PathBuf, message: String },

    #[error("fetch failed for {url}: {message}")]
    NetworkFetch { url: String, message: String },

    #[error("file watch failed for {path}: {message}")]
    Watch { path: PathBuf, message: String },
}

impl FreshetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Self::FileRead { .. } => ErrorKind::FileRead,
            Self::NetworkFetch { .. } => ErrorKind::NetworkFetch,
            Self::Watch { .. } => ErrorKind::Watch,
        }
    }

    pub fn domain(&self) -> &'static str {
        ERROR_DOMAIN
    }

    pub(crate) fn invalid_url(url: &Url, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn file_read(path: &Path, err: &std::io::Error) -> Self {
        Self::FileRead {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn network_fetch(url: &Url, message: impl Into<String>) -> Self {
        Self::NetworkFetch {
            url: url.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn watch(path: &Path, message: impl Into<String>) -> Self {
        Self::Watch {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FreshetError>;
