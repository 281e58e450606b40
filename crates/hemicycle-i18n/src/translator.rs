//! Consumer-facing translation surface.
//!
//! A [`Translator`] is owned by one execution context. It reads its initial
//! locale from the context's [`PreferenceStore`], resolves keys against shared
//! immutable [`Catalogs`], and follows locale changes made by other contexts of
//! the same origin. Views that need to re-render on a switch hold a
//! [`watch::Receiver`] from [`Translator::watch`].

use std::sync::Arc;

use anyhow::{Error as AnyhowError, Result};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    catalog::Catalogs,
    error::I18nError,
    interpolate::{Params, Translation, interpolate, interpolate_resolution},
    preference::{PreferenceStore, Subscription},
    resolve::{Resolution, resolve},
};

/// Resolve and interpolate `key` in an explicit locale.
pub fn translate<'a>(
    catalogs: &'a Catalogs,
    locale: &str,
    key: &'a str,
    params: &Params,
) -> Translation<'a> {
    interpolate_resolution(resolve(catalogs, locale, key), params)
}

/// Render `err` in `locale` using the `errors.*` templates when it carries an
/// [`I18nError`] anywhere in its chain; otherwise its plain message.
pub fn render_error(catalogs: &Catalogs, locale: &str, err: &AnyhowError) -> String {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<I18nError>())
        .map(|core| render_core_error(catalogs, locale, core))
        .unwrap_or_else(|| err.to_string())
}

fn render_core_error(catalogs: &Catalogs, locale: &str, error: &I18nError) -> String {
    let params: Params = error.placeholders().into_iter().collect();
    match resolve(catalogs, locale, error.message_key()) {
        Resolution::Leaf(template) => interpolate(template, &params).into_owned(),
        _ => error.to_string(),
    }
}

pub struct Translator {
    catalogs: Arc<Catalogs>,
    store: PreferenceStore,
    locale: Arc<watch::Sender<String>>,
    _subscription: Subscription,
}

impl Translator {
    /// Build a translator for the context behind `store`.
    ///
    /// A stored locale without a catalog is replaced by the store's default.
    pub fn new(catalogs: Arc<Catalogs>, store: PreferenceStore) -> Self {
        let default_locale = store.default_locale().to_string();
        let initial = accept_locale(&catalogs, store.get(), &default_locale);
        let (sender, _) = watch::channel(initial);
        let locale = Arc::new(sender);

        let subscription = {
            let catalogs = catalogs.clone();
            let locale = locale.clone();
            store.subscribe(move |code| {
                let next = accept_locale(&catalogs, code.to_string(), &default_locale);
                if publish(&locale, next) {
                    debug!(locale = code, "locale switched by another context");
                }
            })
        };

        Self { catalogs, store, locale, _subscription: subscription }
    }

    /// Snapshot of the active locale.
    pub fn locale(&self) -> String {
        self.locale.borrow().clone()
    }

    /// Receiver that observes every locale switch in this context.
    pub fn watch(&self) -> watch::Receiver<String> {
        self.locale.subscribe()
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn available_locales(&self) -> Vec<&str> {
        self.catalogs.locales()
    }

    /// Translate `key` without parameters.
    pub fn t(&self, key: &str) -> String {
        self.t_with(key, &Params::new())
    }

    /// Translate `key`, substituting `params`.
    ///
    /// Missing keys come back as the key itself. A key naming a subtree also
    /// renders as the key; use [`Translator::translate`] to reach the subtree.
    pub fn t_with(&self, key: &str, params: &Params) -> String {
        match self.translate(key, params) {
            Translation::Text(text) => text.into_owned(),
            Translation::Subtree(_) => key.to_string(),
        }
    }

    pub fn translate<'a>(&'a self, key: &'a str, params: &Params) -> Translation<'a> {
        let locale = self.locale.borrow();
        translate(&self.catalogs, &locale, key, params)
    }

    /// Switch this context to `locale` and persist the choice for the origin.
    ///
    /// Every `t` call made after this returns uses the new locale, even when
    /// persisting fails.
    pub fn change_language(&self, locale: &str) -> Result<()> {
        if !self.catalogs.contains(locale) {
            return Err(I18nError::UnknownLocale { locale: locale.to_string() }.into());
        }

        if let Err(err) = self.store.set(locale) {
            warn!(error = %err, locale, "failed to persist locale preference");
        }
        if publish(&self.locale, locale.to_string()) {
            debug!(locale, "locale switched");
        }
        Ok(())
    }

    /// [`render_error`] in the active locale.
    pub fn render_error(&self, err: &AnyhowError) -> String {
        render_error(&self.catalogs, &self.locale.borrow(), err)
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("locale", &*self.locale.borrow())
            .field("context", &self.store.context_id())
            .finish_non_exhaustive()
    }
}

fn accept_locale(catalogs: &Catalogs, candidate: String, default_locale: &str) -> String {
    if catalogs.contains(&candidate) {
        candidate
    } else {
        debug!(locale = %candidate, default = default_locale, "locale has no catalog; using default");
        default_locale.to_string()
    }
}

/// Replace the published locale; receivers wake only on a real change.
fn publish(sender: &watch::Sender<String>, next: String) -> bool {
    sender.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    })
}
