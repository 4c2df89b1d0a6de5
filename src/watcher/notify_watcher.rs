use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{FreshetError, Result};
use crate::watcher::{ChangeFn, FileWatcher, WatchGuard};

/// OS-backed [`FileWatcher`] built on the `notify` crate.
///
/// The underlying mechanism is directory-granularity: each subscription
/// watches the file's parent directory non-recursively and filters events to
/// the target file name.
pub struct NotifyWatcher;

impl NotifyWatcher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NotifyWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FileWatcher for NotifyWatcher {
    fn subscribe(&self, path: &Path, on_change: ChangeFn) -> Result<Box<dyn WatchGuard>> {
        let file_name: OsString = path
            .file_name()
            .ok_or_else(|| FreshetError::watch(path, "path has no file name"))?
            .to_os_string();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        // The event thread takes this lock before invoking, so emptying the
        // slot under the same lock is what makes cancel() synchronous.
        let callback = Arc::new(Mutex::new(Some(on_change)));
        // The callback may itself cancel the subscription; cancel() detects
        // that it runs on the dispatching thread and must not block on it.
        let cancelled = Arc::new(AtomicBool::new(false));
        let dispatching_on: Arc<Mutex<Option<ThreadId>>> = Arc::new(Mutex::new(None));

        let handler_callback = callback.clone();
        let handler_cancelled = cancelled.clone();
        let handler_dispatching = dispatching_on.clone();
        let handler_file_name = file_name.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("File watch event error: {}", e);
                        return;
                    }
                };

                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }

                if !event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == Some(handler_file_name.as_os_str()))
                {
                    return;
                }

                if let Ok(mut marker) = handler_dispatching.lock() {
                    *marker = Some(thread::current().id());
                }
                if let Ok(guard) = handler_callback.lock() {
                    if !handler_cancelled.load(Ordering::SeqCst) {
                        if let Some(on_change) = guard.as_ref() {
                            on_change();
                        }
                    }
                }
                if let Ok(mut marker) = handler_dispatching.lock() {
                    *marker = None;
                }
            },
            Config::default(),
        )
        .map_err(|e| FreshetError::watch(path, e.to_string()))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| FreshetError::watch(path, e.to_string()))?;

        tracing::debug!(path = %path.display(), "watching for local file changes");

        Ok(Box::new(NotifySubscription {
            watcher: Some(watcher),
            dir,
            callback,
            cancelled,
            dispatching_on,
        }))
    }
}

struct NotifySubscription {
    watcher: Option<RecommendedWatcher>,
    dir: PathBuf,
    callback: Arc<Mutex<Option<ChangeFn>>>,
    cancelled: Arc<AtomicBool>,
    dispatching_on: Arc<Mutex<Option<ThreadId>>>,
}

impl WatchGuard for NotifySubscription {
    fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);

        let reentrant = self
            .dispatching_on
            .lock()
            .map(|marker| *marker == Some(thread::current().id()))
            .unwrap_or(false);

        if reentrant {
            // Called from inside on_change: the event thread already holds
            // the callback lock, and the unwatch round-trip would wait on
            // that same thread. The cancelled flag alone stops any further
            // dispatch, and this thread is the only invoker, so the
            // no-invocation-after-return guarantee still holds. Dropping the
            // watcher is a non-blocking shutdown.
            self.watcher.take();
            return;
        }

        if let Ok(mut guard) = self.callback.lock() {
            guard.take();
        }
        if let Some(mut watcher) = self.watcher.take() {
            let _ = watcher.unwatch(&self.dir);
        }
    }
}

impl Drop for NotifySubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
