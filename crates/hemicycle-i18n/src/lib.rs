//! Translation engine for the Hemicycle parliamentary browser.
//!
//! - `catalog` - immutable per-locale key trees
//! - `resolve` - dotted key lookup, no cross-locale fallback
//! - `interpolate` - `{{name}}` substitution
//! - `preference` - durable, origin-scoped locale choice and change notification
//! - `translator` - the per-context facade (`t`, `locale`, `change_language`)

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod interpolate;
pub mod locale;
pub mod paths;
pub mod preference;
pub mod resolve;
pub mod translator;

pub use catalog::{CatalogNode, Catalogs, CoverageReport, LocaleCoverage};
pub use config::I18nConfig;
pub use error::I18nError;
pub use interpolate::{Params, Translation, interpolate};
pub use paths::{Layout, default_root};
pub use preference::{ContextId, Origin, PreferenceStore, Subscription};
pub use resolve::{Resolution, resolve};
pub use translator::Translator;
