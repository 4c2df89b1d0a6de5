pub mod notify_watcher;

use std::path::Path;

use crate::error::Result;

/// Invoked on the watcher's own thread each time the watched file changes.
pub type ChangeFn = Box<dyn Fn() + Send + Sync>;

/// Handle owning an active watch subscription.
///
/// Dropping the guard releases the subscription. [`cancel`](WatchGuard::cancel)
/// does the same with a stronger guarantee: no `ChangeFn` invocation can
/// begin after it returns. Implementations must support being cancelled from
/// within the change callback itself without blocking.
pub trait WatchGuard: Send {
    fn cancel(&mut self);
}

/// Platform file-change notification capability.
///
/// Kept abstract so a resource can be driven by a hand-cranked fake in tests;
/// [`NotifyWatcher`](notify_watcher::NotifyWatcher) is the OS-backed
/// implementation.
pub trait FileWatcher: Send + Sync {
    fn subscribe(&self, path: &Path, on_change: ChangeFn) -> Result<Box<dyn WatchGuard>>;
}
