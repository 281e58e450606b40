//! Filesystem layout helpers for hemicycle-i18n.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::Result;

use crate::error::I18nError;

/// Environment variable that overrides the default root directory.
const ROOT_ENV_KEY: &str = "HEMICYCLE_ROOT";
const DEFAULT_ROOT_DIRNAME: &str = ".hemicycle";
const PREFERENCE_FILENAME: &str = "locale";

/// Descriptor for the on-disk directory structure of one origin.
///
/// Every execution context opened on the same root shares the same locale
/// preference slot.
#[derive(Clone, Debug)]
pub struct Layout {
    root: PathBuf,
    state_dir: PathBuf,
    catalogs_dir: PathBuf,
}

impl Layout {
    /// Construct a new layout without touching the filesystem.
    pub fn new(root: PathBuf) -> Self {
        let state_dir = root.join("state");
        let catalogs_dir = root.join("catalogs");
        Self { root, state_dir, catalogs_dir }
    }

    /// Ensure that all directories exist on disk.
    pub fn ensure(&self) -> Result<()> {
        for dir in [self.root(), self.state_dir()] {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|source| I18nError::CreateDirectory {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }
        Ok(())
    }

    /// Root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory that stores durable per-origin state.
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Directory holding locally overridden catalogs, one file per locale.
    pub fn catalogs_dir(&self) -> &Path {
        &self.catalogs_dir
    }

    /// Path to the persisted locale preference.
    pub fn preference_path(&self) -> PathBuf {
        self.state_dir().join(PREFERENCE_FILENAME)
    }
}

/// Determine the default root directory for hemicycle.
pub fn default_root() -> Result<PathBuf> {
    if let Ok(value) = env::var(ROOT_ENV_KEY) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }

    let home = user_home_dir().ok_or(I18nError::HomeDirectoryUnknown)?;
    Ok(home.join(DEFAULT_ROOT_DIRNAME))
}

fn user_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    None
}
