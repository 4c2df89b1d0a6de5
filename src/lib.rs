//! # Freshet
//!
//! A refreshable local/remote resource abstraction: a resource is identified
//! by a URL pointing at either a local file or a network location, and can be
//! asynchronously (re)loaded on demand, monitored for local file changes, and
//! polled for the last error encountered.
//!
//! ## Architecture
//!
//! ```text
//! RefreshableResource ─┬─ Transport   (network GET, conditional requests)
//!                      └─ FileWatcher (local change notifications)
//! ```
//!
//! Both collaborators are trait seams with default implementations
//! ([`HttpTransport`](transport::http::HttpTransport) on reqwest,
//! [`NotifyWatcher`](watcher::notify_watcher::NotifyWatcher) on notify), so
//! tests drive a resource with in-memory fakes.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use freshet::RefreshableResource;
//! use url::Url;
//!
//! # async fn demo() -> freshet::Result<()> {
//! let url = Url::parse("file:///etc/app/theme.css").unwrap();
//! let resource = Arc::new(RefreshableResource::new(url));
//!
//! let content = resource.refresh(true).await?;
//!
//! resource.clone().start_monitoring_local_file_changes(|r| {
//!     // decide here whether to refresh again
//!     let _ = r.url();
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`resource`]: the [`RefreshableResource`] core
//! - [`transport`]: network fetch seam with ETag/Last-Modified support
//! - [`watcher`]: file-change notification seam
//! - [`error`]: error kinds and the crate [`Result`] alias

/// Error kinds, the stable error domain, and the crate-wide `Result` alias.
pub mod error;

/// The refreshable resource core.
///
/// - [`RefreshableResource`]: dual-mode (local file / network) content source
/// - [`ResourceLocation`](resource::ResourceLocation): location tag resolved
///   once at construction
pub mod resource;

/// Network fetching with conditional request support.
///
/// - [`Transport`](transport::Transport): async trait for issuing a GET
/// - [`HttpTransport`](transport::http::HttpTransport): reqwest-based
///   implementation
pub mod transport;

/// Local file-change monitoring.
///
/// - [`FileWatcher`](watcher::FileWatcher): subscription capability
/// - [`NotifyWatcher`](watcher::notify_watcher::NotifyWatcher): notify-based
///   implementation, directory watch filtered to the target file
pub mod watcher;

pub use error::{ErrorKind, FreshetError, Result, ERROR_DOMAIN};
pub use resource::RefreshableResource;
