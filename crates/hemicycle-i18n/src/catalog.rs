//! Per-locale translation trees.
//!
//! A catalog maps a locale code to a tree whose leaves are strings and whose
//! internal nodes are keyed by path segment. Catalogs are loaded once and never
//! mutated afterwards; share them behind an `Arc`.

use std::{
    collections::BTreeMap,
    ffi::OsStr,
    fs,
    path::Path,
};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    error::I18nError,
    resolve::{Resolution, descend},
};

const BUNDLED: [(&str, &str); 2] = [
    ("en", include_str!("../catalogs/en.json")),
    ("fr", include_str!("../catalogs/fr.json")),
];

/// Internal node of a catalog tree.
pub type Branch = BTreeMap<String, CatalogNode>;

/// A node in a catalog tree: either a translated string or a nested table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogNode {
    Leaf(String),
    Branch(Branch),
}

impl CatalogNode {
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            CatalogNode::Leaf(text) => Some(text),
            CatalogNode::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Branch> {
        match self {
            CatalogNode::Leaf(_) => None,
            CatalogNode::Branch(children) => Some(children),
        }
    }
}

/// Immutable set of catalogs keyed by locale code.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    locales: BTreeMap<String, CatalogNode>,
}

impl Catalogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalogs compiled into the crate (`en`, `fr`).
    pub fn bundled() -> Result<Self> {
        let mut catalogs = Self::new();
        for (locale, raw) in BUNDLED {
            catalogs.add_json(locale, raw)?;
        }
        Ok(catalogs)
    }

    /// Parse a document shaped `{ "<locale>": { ...tree... }, ... }`.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let locales: BTreeMap<String, CatalogNode> = serde_json::from_str(raw)
            .map_err(|source| I18nError::ParseJson { locale: "*".to_string(), source })?;
        let mut catalogs = Self::new();
        for (locale, tree) in locales {
            catalogs.insert(locale, tree)?;
        }
        Ok(catalogs)
    }

    /// TOML counterpart of [`Catalogs::from_json_str`]: one table per locale.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let locales: BTreeMap<String, CatalogNode> = toml_edit::de::from_str(raw)
            .map_err(|source| I18nError::ParseToml { locale: "*".to_string(), source })?;
        let mut catalogs = Self::new();
        for (locale, tree) in locales {
            catalogs.insert(locale, tree)?;
        }
        Ok(catalogs)
    }

    /// Load every `<locale>.json` / `<locale>.toml` file from a directory.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut catalogs = Self::new();
        let entries = fs::read_dir(dir)
            .map_err(|source| I18nError::ReadDirectory { path: dir.to_path_buf(), source })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|source| I18nError::ReadDirectory { path: dir.to_path_buf(), source })?;
            let path = entry.path();
            if path.is_file() && is_supported_catalog_extension(path.extension()) {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let Some(locale) = path.file_stem().and_then(OsStr::to_str) else {
                continue;
            };
            let raw = fs::read_to_string(&path)
                .map_err(|source| I18nError::ReadCatalog { path: path.clone(), source })?;
            if path.extension().and_then(OsStr::to_str) == Some("toml") {
                catalogs.add_toml(locale, &raw)?;
            } else {
                catalogs.add_json(locale, &raw)?;
            }
        }
        Ok(catalogs)
    }

    /// Parse a single locale's tree from JSON and register it.
    pub fn add_json(&mut self, locale: &str, raw: &str) -> Result<()> {
        let tree: CatalogNode = serde_json::from_str(raw)
            .map_err(|source| I18nError::ParseJson { locale: locale.to_string(), source })?;
        self.insert(locale, tree)
    }

    /// Parse a single locale's tree from TOML and register it.
    pub fn add_toml(&mut self, locale: &str, raw: &str) -> Result<()> {
        let tree: CatalogNode = toml_edit::de::from_str(raw)
            .map_err(|source| I18nError::ParseToml { locale: locale.to_string(), source })?;
        self.insert(locale, tree)
    }

    /// Register a tree for a locale, replacing any previous one.
    ///
    /// The root must be a table; a bare string is rejected.
    pub fn insert(&mut self, locale: impl Into<String>, tree: CatalogNode) -> Result<()> {
        let locale = locale.into();
        if tree.as_branch().is_none() {
            return Err(I18nError::InvalidCatalog { locale }.into());
        }
        self.locales.insert(locale, tree);
        Ok(())
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    /// Root of a locale's tree, if the locale is configured.
    pub fn root(&self, locale: &str) -> Option<&CatalogNode> {
        self.locales.get(locale)
    }

    /// Configured locale codes in sorted order.
    pub fn locales(&self) -> Vec<&str> {
        self.locales.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// Every dotted path that ends on a string leaf in `locale`, sorted.
    pub fn leaf_keys(&self, locale: &str) -> Vec<String> {
        let Some(root) = self.root(locale) else {
            return Vec::new();
        };

        let mut keys = Vec::new();
        let mut stack: Vec<(String, &CatalogNode)> = vec![(String::new(), root)];
        while let Some((prefix, node)) = stack.pop() {
            match node {
                CatalogNode::Leaf(_) => keys.push(prefix),
                CatalogNode::Branch(children) => {
                    for (segment, child) in children {
                        let path = if prefix.is_empty() {
                            segment.clone()
                        } else {
                            format!("{prefix}.{segment}")
                        };
                        stack.push((path, child));
                    }
                }
            }
        }
        keys.sort_unstable();
        keys
    }

    /// Union of leaf keys across every locale, sorted and deduplicated.
    pub fn all_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> =
            self.locales.keys().flat_map(|locale| self.leaf_keys(locale)).collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Keys from `reference` that do not resolve to a string in `locale`.
    ///
    /// No other locale is consulted.
    pub fn missing_keys(&self, locale: &str, reference: &[&str]) -> Vec<String> {
        let mut missing: Vec<String> = reference
            .iter()
            .copied()
            .filter(|key| !self.has_leaf(locale, key))
            .map(str::to_string)
            .collect();
        missing.sort_unstable();
        missing
    }

    fn has_leaf(&self, locale: &str, key: &str) -> bool {
        self.root(locale)
            .map(|root| matches!(descend(root, key), Resolution::Leaf(_)))
            .unwrap_or(false)
    }

    /// Coverage of every locale against the union of all keys.
    pub fn coverage_report(&self) -> CoverageReport {
        let all = self.all_keys();
        let reference: Vec<&str> = all.iter().map(String::as_str).collect();
        let total = reference.len();

        let locales = self
            .locales
            .keys()
            .map(|locale| {
                let missing = self.missing_keys(locale, &reference);
                let present = total.saturating_sub(missing.len());
                let coverage_percent =
                    if total == 0 { 100.0 } else { (present as f32 / total as f32) * 100.0 };
                LocaleCoverage { locale: locale.clone(), present, missing, coverage_percent }
            })
            .collect();

        CoverageReport { total_keys: total, locales }
    }
}

/// Key coverage across all configured locales.
#[derive(Debug, Clone)]
pub struct CoverageReport {
    pub total_keys: usize,
    pub locales: Vec<LocaleCoverage>,
}

#[derive(Debug, Clone)]
pub struct LocaleCoverage {
    pub locale: String,
    pub present: usize,
    pub missing: Vec<String>,
    /// 0.0 to 100.0
    pub coverage_percent: f32,
}

fn is_supported_catalog_extension(ext: Option<&OsStr>) -> bool {
    matches!(ext.and_then(|s| s.to_str()), Some("json" | "toml"))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn sample() -> Catalogs {
        Catalogs::from_json_str(
            r#"{
                "en": {"a": {"b": "Hi {{x}}", "c": "C"}, "top": "Top"},
                "fr": {"a": {"b": "Salut {{x}}"}}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_nested_tree() {
        let catalogs = sample();
        assert_eq!(catalogs.locales(), vec!["en", "fr"]);
        let root = catalogs.root("en").unwrap().as_branch().unwrap();
        let a = root.get("a").unwrap().as_branch().unwrap();
        assert_eq!(a.get("b").unwrap().as_leaf(), Some("Hi {{x}}"));
    }

    #[test]
    fn rejects_leaf_root() {
        let err = Catalogs::from_json_str(r#"{"en": "flat"}"#).unwrap_err();
        let core = err.downcast_ref::<I18nError>().unwrap();
        assert!(matches!(core, I18nError::InvalidCatalog { locale } if locale == "en"));
    }

    #[test]
    fn parses_multi_locale_toml() {
        let catalogs = Catalogs::from_toml_str(
            "[en.nav]\nhome = \"Home\"\n\n[fr.nav]\nhome = \"Accueil\"\n",
        )
        .unwrap();
        assert_eq!(catalogs.locales(), vec!["en", "fr"]);
        assert_eq!(catalogs.leaf_keys("fr"), vec!["nav.home"]);

        let err = Catalogs::from_toml_str("en = \"flat\"").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<I18nError>(),
            Some(I18nError::InvalidCatalog { locale }) if locale == "en"
        ));
    }

    #[test]
    fn rejects_non_string_leaves() {
        let mut catalogs = Catalogs::new();
        let err = catalogs.add_json("en", r#"{"count": 3}"#).unwrap_err();
        assert!(err.to_string().contains("'en'"), "unexpected error: {err:?}");
    }

    #[test]
    fn leaf_keys_are_sorted_paths() {
        let catalogs = sample();
        assert_eq!(catalogs.leaf_keys("en"), vec!["a.b", "a.c", "top"]);
        assert!(catalogs.leaf_keys("de").is_empty());
    }

    #[test]
    fn missing_keys_do_not_fall_back() {
        let catalogs = sample();
        let missing = catalogs.missing_keys("fr", &["a.b", "a.c", "top"]);
        assert_eq!(missing, vec!["a.c", "top"]);
        // a subtree is not a translation
        assert_eq!(catalogs.missing_keys("en", &["a"]), vec!["a"]);
    }

    #[test]
    fn coverage_report_counts_per_locale() {
        let report = sample().coverage_report();
        assert_eq!(report.total_keys, 3);

        let en = report.locales.iter().find(|l| l.locale == "en").unwrap();
        assert_eq!(en.present, 3);
        assert!((en.coverage_percent - 100.0).abs() < f32::EPSILON);

        let fr = report.locales.iter().find(|l| l.locale == "fr").unwrap();
        assert_eq!(fr.present, 1);
        assert_eq!(fr.missing, vec!["a.c", "top"]);
        assert!((fr.coverage_percent - 33.333_332).abs() < 0.01);
    }

    #[test]
    fn empty_catalogs_report_full_coverage() {
        let report = Catalogs::new().coverage_report();
        assert_eq!(report.total_keys, 0);
        assert!(report.locales.is_empty());
    }

    #[test]
    fn loads_json_and_toml_from_dir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("en.json"), r#"{"nav": {"home": "Home"}}"#).unwrap();
        fs::write(dir.path().join("fr.toml"), "[nav]\nhome = \"Accueil\"\n").unwrap();
        fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let catalogs = Catalogs::from_dir(dir.path()).unwrap();
        assert_eq!(catalogs.locales(), vec!["en", "fr"]);
        assert_eq!(catalogs.leaf_keys("fr"), vec!["nav.home"]);
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = tempdir().unwrap();
        let err = Catalogs::from_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<I18nError>(),
            Some(I18nError::ReadDirectory { .. })
        ));
    }

    #[test]
    fn bundled_catalogs_cover_both_locales() {
        let catalogs = Catalogs::bundled().unwrap();
        assert!(catalogs.contains("en"));
        assert!(catalogs.contains("fr"));
        assert!(catalogs.leaf_keys("en").contains(&"common.status.loading".to_string()));
    }
}
