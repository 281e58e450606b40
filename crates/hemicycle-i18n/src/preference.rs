//! Durable, origin-scoped locale preference with cross-context notification.
//!
//! An [`Origin`] owns the single preference slot on disk (`<root>/state/locale`)
//! and the subscriber list for this process. Each execution context obtains
//! its own [`PreferenceStore`] from the origin; writes made through one store
//! are announced to the subscribers of every *other* context. Writes made by
//! another process are picked up by [`Origin::poll_external`], which the
//! watcher task runs on an interval.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use anyhow::Result;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{error::I18nError, paths::Layout};

type Callback = Arc<dyn Fn(&str) + Send + Sync>;

/// Identity of one execution context within an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl ContextId {
    fn new() -> Self {
        ContextId(Uuid::new_v4())
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Shared handle to one origin's preference slot.
#[derive(Clone)]
pub struct Origin {
    inner: Arc<OriginInner>,
}

struct OriginInner {
    path: PathBuf,
    default_locale: String,
    subscribers: RwLock<Vec<Subscriber>>,
    /// Slot contents as last written or observed by this process.
    last_seen: Mutex<Option<String>>,
    next_subscriber: AtomicU64,
}

struct Subscriber {
    id: u64,
    context: ContextId,
    callback: Callback,
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Origin")
            .field("path", &self.inner.path)
            .field("default_locale", &self.inner.default_locale)
            .finish_non_exhaustive()
    }
}

impl Origin {
    /// Open the origin rooted at `layout`, creating its state directory.
    pub fn open(layout: &Layout, default_locale: impl Into<String>) -> Result<Self> {
        layout.ensure()?;
        let path = layout.preference_path();
        let current = read_slot(&path)?;
        Ok(Self {
            inner: Arc::new(OriginInner {
                path,
                default_locale: default_locale.into(),
                subscribers: RwLock::new(Vec::new()),
                last_seen: Mutex::new(current),
                next_subscriber: AtomicU64::new(0),
            }),
        })
    }

    /// Create a store for a new execution context.
    pub fn context(&self) -> PreferenceStore {
        PreferenceStore { origin: self.clone(), context: ContextId::new() }
    }

    pub fn default_locale(&self) -> &str {
        &self.inner.default_locale
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Re-read the slot and notify every local context if another process
    /// changed it. Returns whether a change was seen.
    pub fn poll_external(&self) -> Result<bool> {
        let value = {
            let mut last_seen = self.lock_last_seen();
            let current = read_slot(self.path())?;
            if *last_seen == current {
                return Ok(false);
            }
            *last_seen = current.clone();
            current.unwrap_or_else(|| self.inner.default_locale.clone())
        };

        debug!(locale = %value, "locale preference changed by another process");
        self.notify(None, &value);
        Ok(true)
    }

    /// Poll for external writes every `interval` until the handle is aborted.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_watcher(&self, interval: Duration) -> JoinHandle<()> {
        let origin = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(err) = origin.poll_external() {
                    warn!(error = %err, "failed to poll locale preference");
                }
            }
        })
    }

    fn notify(&self, writer: Option<ContextId>, value: &str) {
        let callbacks: Vec<Callback> = self
            .inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|subscriber| Some(subscriber.context) != writer)
            .map(|subscriber| subscriber.callback.clone())
            .collect();
        for callback in callbacks {
            callback(value);
        }
    }

    fn lock_last_seen(&self) -> MutexGuard<'_, Option<String>> {
        self.inner.last_seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One execution context's view of the origin's locale preference.
#[derive(Clone, Debug)]
pub struct PreferenceStore {
    origin: Origin,
    context: ContextId,
}

impl PreferenceStore {
    pub fn context_id(&self) -> ContextId {
        self.context
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn default_locale(&self) -> &str {
        self.origin.default_locale()
    }

    /// Last stored locale, or the default when nothing usable is stored.
    pub fn get(&self) -> String {
        match read_slot(self.origin.path()) {
            Ok(Some(locale)) => locale,
            Ok(None) => self.default_locale().to_string(),
            Err(err) => {
                warn!(error = %err, "failed to read locale preference; using default");
                self.default_locale().to_string()
            }
        }
    }

    /// Persist `locale` and notify the other contexts of this origin.
    ///
    /// The writing context is never notified of its own write. Other contexts
    /// are notified whenever the value differs from what this process last
    /// saw, even if another process already wrote the same value.
    pub fn set(&self, locale: &str) -> Result<()> {
        let path = self.origin.path();
        let changed = {
            let mut last_seen = self.origin.lock_last_seen();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| I18nError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(path, locale)
                .map_err(|source| I18nError::WritePreference { path: path.to_path_buf(), source })?;
            last_seen.replace(locale.to_string()).as_deref() != Some(locale)
        };

        if changed {
            debug!(context = %self.context, locale, "locale preference stored");
            self.origin.notify(Some(self.context), locale);
        }
        Ok(())
    }

    /// Register `on_change` for writes made by other contexts.
    ///
    /// The callback runs on the thread that observed the write. Dropping the
    /// returned [`Subscription`] unregisters it.
    pub fn subscribe<F>(&self, on_change: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.origin.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.origin
            .inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber { id, context: self.context, callback: Arc::new(on_change) });
        Subscription { origin: Arc::downgrade(&self.origin.inner), id }
    }
}

/// Live registration returned by [`PreferenceStore::subscribe`].
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    origin: Weak<OriginInner>,
    id: u64,
}

impl Subscription {
    /// Consume the handle; removal happens in `Drop`.
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(origin) = self.origin.upgrade() {
            origin
                .subscribers
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|subscriber| subscriber.id != self.id);
        }
    }
}

/// Read the slot; absent files and blank contents both mean "no preference".
fn read_slot(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => {
            let trimmed = raw.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => {
            Err(I18nError::ReadPreference { path: path.to_path_buf(), source }.into())
        }
    }
}
