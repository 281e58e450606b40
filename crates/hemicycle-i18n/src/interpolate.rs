//! `{{name}}` placeholder substitution.

use std::{borrow::Cow, collections::BTreeMap, fmt::Display};

use crate::{catalog::Branch, resolve::Resolution};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Named values substituted into a translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Params::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.values.insert(name.into(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

impl<K: Into<String>, V: Display, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Result of translating a key: text, or a subtree passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation<'a> {
    Text(Cow<'a, str>),
    Subtree(&'a Branch),
}

impl Translation<'_> {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Translation::Text(text) => Some(text),
            Translation::Subtree(_) => None,
        }
    }
}

/// Interpolate a resolution. Subtrees skip interpolation; a missing key is
/// interpolated like any other text.
pub fn interpolate_resolution<'a>(resolution: Resolution<'a>, params: &Params) -> Translation<'a> {
    match resolution {
        Resolution::Leaf(text) | Resolution::Missing(text) => {
            Translation::Text(interpolate(text, params))
        }
        Resolution::Subtree(children) => Translation::Subtree(children),
    }
}

/// Replace every `{{identifier}}` in `template` with its value from `params`.
///
/// Identifiers are one or more of `[A-Za-z0-9_]`. Placeholders without a value
/// are left as written. Substituted text is not scanned again.
pub fn interpolate<'a>(template: &'a str, params: &Params) -> Cow<'a, str> {
    if params.is_empty() || !template.contains(OPEN) {
        return Cow::Borrowed(template);
    }

    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find(OPEN) {
        result.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];
        let ident_len = after.bytes().take_while(|b| is_word_byte(*b)).count();

        if ident_len == 0 || !after[ident_len..].starts_with(CLOSE) {
            // not a placeholder here; retry from the next brace
            result.push('{');
            rest = &rest[start + 1..];
            continue;
        }

        let name = &after[..ident_len];
        let end = start + OPEN.len() + ident_len + CLOSE.len();
        match params.get(name) {
            Some(value) => result.push_str(value),
            None => result.push_str(&rest[start..end]),
        }
        rest = &rest[end..];
    }
    result.push_str(rest);
    Cow::Owned(result)
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
