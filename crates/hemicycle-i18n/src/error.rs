use std::{
    io,
    path::{Path, PathBuf},
};

use serde_json::Error as JsonError;
use thiserror::Error;
use toml_edit::de::Error as TomlDeError;

#[derive(Debug, Error)]
pub enum I18nError {
    #[error("locale '{locale}' has no catalog")]
    UnknownLocale { locale: String },

    #[error("catalog for locale '{locale}' must be a table of strings")]
    InvalidCatalog { locale: String },

    #[error("failed to read catalog file {path}")]
    ReadCatalog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse JSON catalog for locale '{locale}'")]
    ParseJson {
        locale: String,
        #[source]
        source: JsonError,
    },

    #[error("failed to parse TOML catalog for locale '{locale}'")]
    ParseToml {
        locale: String,
        #[source]
        source: TomlDeError,
    },

    #[error("failed to create directory {path}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read directory {path}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read locale preference {path}")]
    ReadPreference {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write locale preference {path}")]
    WritePreference {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to determine user home directory for HEMICYCLE_ROOT")]
    HomeDirectoryUnknown,
}

impl I18nError {
    /// Catalog key used to render this error for end users.
    pub fn message_key(&self) -> &'static str {
        match self {
            I18nError::UnknownLocale { .. } => "errors.unknown_locale",
            I18nError::InvalidCatalog { .. } => "errors.invalid_catalog",
            I18nError::ReadCatalog { .. } => "errors.read_catalog_failed",
            I18nError::ParseJson { .. } => "errors.parse_json_failed",
            I18nError::ParseToml { .. } => "errors.parse_toml_failed",
            I18nError::CreateDirectory { .. } => "errors.create_dir_failed",
            I18nError::ReadDirectory { .. } => "errors.read_dir_failed",
            I18nError::ReadPreference { .. } => "errors.read_preference_failed",
            I18nError::WritePreference { .. } => "errors.write_preference_failed",
            I18nError::HomeDirectoryUnknown => "errors.home_dir_unknown",
        }
    }

    pub fn placeholders(&self) -> Vec<(&'static str, String)> {
        match self {
            I18nError::UnknownLocale { locale } | I18nError::InvalidCatalog { locale } => {
                vec![("locale", locale.clone())]
            }
            I18nError::ParseJson { locale, source } => {
                vec![("locale", locale.clone()), ("error", source.to_string())]
            }
            I18nError::ParseToml { locale, source } => {
                vec![("locale", locale.clone()), ("error", source.to_string())]
            }
            I18nError::ReadCatalog { path, source }
            | I18nError::CreateDirectory { path, source }
            | I18nError::ReadDirectory { path, source }
            | I18nError::ReadPreference { path, source }
            | I18nError::WritePreference { path, source } => {
                vec![("path", display_path(path)), ("error", source.to_string())]
            }
            I18nError::HomeDirectoryUnknown => Vec::new(),
        }
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_expose_path_and_cause() {
        let err = I18nError::WritePreference {
            path: PathBuf::from("/tmp/state/locale"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.message_key(), "errors.write_preference_failed");
        let placeholders = err.placeholders();
        assert_eq!(placeholders[0], ("path", "/tmp/state/locale".to_string()));
        assert_eq!(placeholders[1], ("error", "denied".to_string()));
    }

    #[test]
    fn home_dir_error_has_no_placeholders() {
        assert!(I18nError::HomeDirectoryUnknown.placeholders().is_empty());
    }
}
