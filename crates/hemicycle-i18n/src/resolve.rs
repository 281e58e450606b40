//! Dotted key lookup inside a catalog tree.

use tracing::warn;

use crate::catalog::{Branch, CatalogNode, Catalogs};

/// Outcome of walking a dotted key through one locale's tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The path ends on a translated string.
    Leaf(&'a str),
    /// The path ends on an internal node; returned untouched.
    Subtree(&'a Branch),
    /// Some segment was absent; carries the original key.
    Missing(&'a str),
}

impl<'a> Resolution<'a> {
    /// Text to show for this resolution, if it is not a subtree.
    ///
    /// A missing key yields the key itself.
    pub fn as_text(&self) -> Option<&'a str> {
        match *self {
            Resolution::Leaf(text) | Resolution::Missing(text) => Some(text),
            Resolution::Subtree(_) => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Resolution::Missing(_))
    }
}

/// Resolve `key` in `locale`'s catalog.
///
/// There is no fallback to another locale. A miss logs a warning naming the
/// key and yields [`Resolution::Missing`].
pub fn resolve<'a>(catalogs: &'a Catalogs, locale: &str, key: &'a str) -> Resolution<'a> {
    let resolution = match catalogs.root(locale) {
        Some(root) => descend(root, key),
        None => Resolution::Missing(key),
    };
    if resolution.is_missing() {
        warn!(locale, key, "missing translation key");
    }
    resolution
}

/// Walk `key` segment by segment from `root`. Does not log.
pub fn descend<'a>(root: &'a CatalogNode, key: &'a str) -> Resolution<'a> {
    let mut node = root;
    for segment in key.split('.') {
        let CatalogNode::Branch(children) = node else {
            return Resolution::Missing(key);
        };
        match children.get(segment) {
            Some(child) => node = child,
            None => return Resolution::Missing(key),
        }
    }

    match node {
        CatalogNode::Leaf(text) => Resolution::Leaf(text),
        CatalogNode::Branch(children) => Resolution::Subtree(children),
    }
}
