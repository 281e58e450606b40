use std::env;

use locale_config::Locale;

/// Environment variable naming the preferred UI language.
pub const LANG_ENV_KEY: &str = "HEMICYCLE_LANG";
/// Used when neither configuration nor the system names a configured locale.
pub const FALLBACK_LOCALE: &str = "en";

/// Pick a default locale among `available`.
///
/// Consults `HEMICYCLE_LANG`, then the system locale tags, keeping the first
/// tag that matches a configured locale; otherwise [`FALLBACK_LOCALE`].
pub fn detect_default_locale(available: &[&str]) -> String {
    if let Ok(value) = env::var(LANG_ENV_KEY) {
        if let Some(locale) = match_language_tag(&value, available) {
            return locale;
        }
    }

    let system = Locale::user_default();
    for (_category, tag) in system.tags() {
        if let Some(locale) = match_language_tag(tag.as_ref(), available) {
            return locale;
        }
    }

    FALLBACK_LOCALE.to_string()
}

/// Map a raw language tag (`fr_FR.UTF-8`, `LC_ALL=fr-ca`, `en-GB@euro`) onto
/// one of `available`: an exact match first, then the primary subtag.
pub fn match_language_tag(raw: &str, available: &[&str]) -> Option<String> {
    let normalized = normalize_tag(raw)?;
    if let Some(exact) = available.iter().find(|code| code.eq_ignore_ascii_case(&normalized)) {
        return Some(exact.to_string());
    }

    let primary = normalized.split('-').next().unwrap_or(&normalized);
    available
        .iter()
        .find(|code| code.eq_ignore_ascii_case(primary))
        .map(|code| code.to_string())
}

fn normalize_tag(raw: &str) -> Option<String> {
    let mut normalized = raw
        .trim()
        .split('=')
        .next_back()
        .unwrap_or(raw)
        .replace('_', "-")
        .to_ascii_lowercase();

    if let Some(idx) = normalized.find('@') {
        normalized.truncate(idx);
    }
    if let Some(idx) = normalized.find('.') {
        normalized.truncate(idx);
    }

    (!normalized.is_empty()).then_some(normalized)
}
