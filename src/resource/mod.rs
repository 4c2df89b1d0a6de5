use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use tokio::task::JoinHandle;
use url::Url;

use crate::error::{FreshetError, Result};
use crate::transport::http::HttpTransport;
use crate::transport::{FetchResponse, Transport, Validators};
use crate::watcher::notify_watcher::NotifyWatcher;
use crate::watcher::{FileWatcher, WatchGuard};

/// Where a resource URL actually points, resolved once at construction so
/// refresh dispatch is a pure match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocation {
    Local(PathBuf),
    Remote(Url),
    /// The URL fits neither mode; every refresh reports `InvalidUrl`.
    Unresolved,
}

impl ResourceLocation {
    fn resolve(url: &Url) -> Self {
        match url.scheme() {
            "file" => match url.to_file_path() {
                Ok(path) => Self::Local(path),
                Err(()) => Self::Unresolved,
            },
            "http" | "https" => Self::Remote(url.clone()),
            _ => Self::Unresolved,
        }
    }
}

/// Last-known-good content plus what is needed to detect "unchanged" on the
/// next unforced refresh: HTTP validators for remote resources, the file
/// modification time for local ones.
struct Cached {
    content: String,
    validators: Validators,
    modified: Option<SystemTime>,
}

#[derive(Default)]
struct ResourceState {
    cached: Option<Cached>,
    last_error: Option<FreshetError>,
}

/// A resource identified by a URL pointing at either a local file or a
/// network location.
///
/// Construction performs no I/O. [`refresh`](Self::refresh) retrieves the
/// content; [`start_monitoring_local_file_changes`](Self::start_monitoring_local_file_changes)
/// establishes a standing change subscription for local files. The most
/// recent refresh failure stays poll-able through
/// [`last_error`](Self::last_error) until a later refresh succeeds.
pub struct RefreshableResource {
    url: Url,
    location: ResourceLocation,
    transport: Arc<dyn Transport>,
    watcher: Arc<dyn FileWatcher>,
    state: Mutex<ResourceState>,
    watch: Mutex<Option<Box<dyn WatchGuard>>>,
}

impl RefreshableResource {
    pub fn new(url: Url) -> Self {
        Self::with_collaborators(url, Arc::new(HttpTransport::new()), Arc::new(NotifyWatcher::new()))
    }

    /// Construct with injected transport and watcher capabilities.
    pub fn with_collaborators(
        url: Url,
        transport: Arc<dyn Transport>,
        watcher: Arc<dyn FileWatcher>,
    ) -> Self {
        let location = ResourceLocation::resolve(&url);
        Self {
            url,
            location,
            transport,
            watcher,
            state: Mutex::new(ResourceState::default()),
            watch: Mutex::new(None),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn location(&self) -> &ResourceLocation {
        &self.location
    }

    /// True iff an active file-change subscription exists.
    pub fn is_monitoring(&self) -> bool {
        self.watch.lock().expect("watch slot lock poisoned").is_some()
    }

    /// True once a refresh attempt has failed and no refresh has succeeded
    /// since.
    pub fn has_error_occurred(&self) -> bool {
        self.last_error().is_some()
    }

    /// The most recent refresh failure. Cleared by the next successful
    /// refresh.
    pub fn last_error(&self) -> Option<FreshetError> {
        self.state
            .lock()
            .expect("resource state lock poisoned")
            .last_error
            .clone()
    }

    /// Last-known-good content from the most recent successful refresh.
    pub fn cached_content(&self) -> Option<String> {
        self.state
            .lock()
            .expect("resource state lock poisoned")
            .cached
            .as_ref()
            .map(|c| c.content.clone())
    }

    /// Retrieve the resource's content.
    ///
    /// With `force=false` a cheap change check (file mtime, or a conditional
    /// GET using stored validators) may short-circuit to the cached content;
    /// `force=true` always performs a full read or fetch. The returned future
    /// resolves exactly once per call, after error state has been updated, so
    /// awaiting it is the completion notification. Failures never panic or
    /// escape outside the returned `Result`.
    pub async fn refresh(&self, force: bool) -> Result<String> {
        let outcome = match &self.location {
            ResourceLocation::Local(path) => self.refresh_local(path, force).await,
            ResourceLocation::Remote(url) => self.refresh_remote(url, force).await,
            ResourceLocation::Unresolved => Err(FreshetError::invalid_url(
                &self.url,
                "not a local file or http(s) location",
            )),
        };

        let mut state = self.state.lock().expect("resource state lock poisoned");
        match &outcome {
            Ok(_) => state.last_error = None,
            Err(err) => {
                tracing::warn!(url = %self.url, error = %err, "refresh failed");
                state.last_error = Some(err.clone());
            }
        }
        drop(state);

        outcome
    }

    /// Detached refresh: runs on a spawned task holding its own reference, so
    /// the completion callback fires exactly once even if every other handle
    /// to the resource is dropped mid-flight.
    pub fn spawn_refresh<F>(self: Arc<Self>, force: bool, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(&RefreshableResource, Result<String>) + Send + 'static,
    {
        tokio::spawn(async move {
            let outcome = self.refresh(force).await;
            on_complete(&self, outcome);
        })
    }

    async fn refresh_local(&self, path: &Path, force: bool) -> Result<String> {
        let modified = tokio::fs::metadata(path)
            .await
            .ok()
            .and_then(|m| m.modified().ok());

        if !force {
            let state = self.state.lock().expect("resource state lock poisoned");
            if let Some(cached) = &state.cached {
                if cached.modified.is_some() && cached.modified == modified {
                    tracing::debug!(path = %path.display(), "file unchanged, serving cached content");
                    return Ok(cached.content.clone());
                }
            }
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FreshetError::file_read(path, &e))?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "read local resource");

        let mut state = self.state.lock().expect("resource state lock poisoned");
        state.cached = Some(Cached {
            content: content.clone(),
            validators: Validators::default(),
            modified,
        });

        Ok(content)
    }

    async fn refresh_remote(&self, url: &Url, force: bool) -> Result<String> {
        let validators = if force {
            Validators::default()
        } else {
            let state = self.state.lock().expect("resource state lock poisoned");
            state
                .cached
                .as_ref()
                .map(|c| c.validators.clone())
                .unwrap_or_default()
        };

        match self.transport.fetch(url, &validators).await? {
            FetchResponse::NotModified => {
                let state = self.state.lock().expect("resource state lock poisoned");
                match &state.cached {
                    Some(cached) => {
                        tracing::debug!(url = %url, "not modified, serving cached content");
                        Ok(cached.content.clone())
                    }
                    // A 304 is only valid in reply to validators we sent, and
                    // validators only exist alongside a cached body.
                    None => Err(FreshetError::network_fetch(
                        url,
                        "not-modified response without cached content",
                    )),
                }
            }
            FetchResponse::Content {
                body,
                etag,
                last_modified,
            } => {
                tracing::debug!(url = %url, bytes = body.len(), "fetched remote resource");
                let mut state = self.state.lock().expect("resource state lock poisoned");
                state.cached = Some(Cached {
                    content: body.clone(),
                    validators: Validators {
                        etag,
                        last_modified,
                    },
                    modified: None,
                });
                Ok(body)
            }
        }
    }

    /// Subscribe to change notifications for a local-file resource.
    ///
    /// `on_change` receives the resource itself on every detected change; it
    /// is up to the caller to decide whether to refresh in response, and no
    /// refresh happens automatically. For non-local resources this is a
    /// no-op. Calling it again while already monitoring replaces the previous
    /// callback, keeping a single active subscription.
    pub fn start_monitoring_local_file_changes<F>(self: Arc<Self>, on_change: F) -> Result<()>
    where
        F: Fn(&RefreshableResource) + Send + Sync + 'static,
    {
        let path = match &self.location {
            ResourceLocation::Local(path) => path.clone(),
            _ => {
                tracing::debug!(url = %self.url, "not a local file, ignoring monitoring request");
                return Ok(());
            }
        };

        // Weak capture: the subscription must not keep the resource alive,
        // and a change arriving after the resource is gone must go nowhere.
        let weak = Arc::downgrade(&self);
        let guard = self.watcher.subscribe(
            &path,
            Box::new(move || {
                if let Some(resource) = weak.upgrade() {
                    on_change(&resource);
                }
            }),
        )?;

        // Swap outside the lock: cancel() blocks on an in-flight on_change,
        // which may itself be calling back into this resource.
        let previous = self
            .watch
            .lock()
            .expect("watch slot lock poisoned")
            .replace(guard);
        if let Some(mut previous) = previous {
            previous.cancel();
        }

        tracing::debug!(url = %self.url, "monitoring local file changes");
        Ok(())
    }

    /// Release the change subscription. Idempotent; once this returns, no
    /// further `on_change` invocation can begin.
    pub fn end_monitoring_local_file_changes(&self) {
        let taken = self.watch.lock().expect("watch slot lock poisoned").take();
        if let Some(mut guard) = taken {
            guard.cancel();
            tracing::debug!(url = %self.url, "stopped monitoring local file changes");
        }
    }
}
