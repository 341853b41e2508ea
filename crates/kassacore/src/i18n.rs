use std::collections::HashMap;

use fluent_templates::{
    fluent_bundle::{FluentArgs, FluentValue},
    static_loader, Loader,
};
use once_cell::sync::Lazy;
use unic_langid::LanguageIdentifier;

static_loader! {
    static LOCALES = {
        locales: "./locales",
        fallback_language: "ru",
    };
}

/// Supported languages (code, human-readable name).
pub static SUPPORTED_LANGS: &[(&str, &str)] = &[("ru", "🇷🇺 Русский"), ("ky", "🇰🇬 Кыргызча")];

/// Default language identifier used as a fallback.
static DEFAULT_LANG: Lazy<LanguageIdentifier> = Lazy::new(|| "ru".parse().unwrap());

/// Normalizes a language code into a LanguageIdentifier (falls back to default).
pub fn lang_from_code(code: &str) -> LanguageIdentifier {
    let normalized = code.split('-').next().unwrap_or(code).to_lowercase();
    if is_language_supported(&normalized).is_none() {
        return DEFAULT_LANG.clone();
    }
    normalized.parse().unwrap_or_else(|_| DEFAULT_LANG.clone())
}

/// Returns a localized string for the given key.
pub fn t(lang: &LanguageIdentifier, key: &str) -> String {
    LOCALES
        .lookup(lang, key)
        .unwrap_or_else(|| LOCALES.lookup(&DEFAULT_LANG, key).unwrap_or_else(|| key.to_string()))
}

/// Returns a localized string with arguments for interpolation.
pub fn t_args(lang: &LanguageIdentifier, key: &str, args: &FluentArgs) -> String {
    let args_map: HashMap<String, FluentValue> =
        args.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();

    LOCALES.lookup_with_args(lang, key, &args_map).unwrap_or_else(|| {
        LOCALES
            .lookup_with_args(&DEFAULT_LANG, key, &args_map)
            .unwrap_or_else(|| key.to_string())
    })
}

/// Checks if a language code is supported.
/// Returns the normalized code if supported, None otherwise.
pub fn is_language_supported(code: &str) -> Option<&'static str> {
    let normalized = code.split('-').next().unwrap_or(code).to_lowercase();
    SUPPORTED_LANGS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(&normalized))
        .map(|(c, _)| *c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_known_translation() {
        let ru = lang_from_code("ru");
        let ky = lang_from_code("ky");

        assert_eq!(t(&ru, "deposit-cancel"), "❌ Операция отменена");
        assert_eq!(t(&ky, "deposit-cancel"), "❌ Аракет жокко чыгарылды");
    }

    #[test]
    fn unknown_lang_falls_back_to_russian() {
        let lang = lang_from_code("ja");
        assert_eq!(t(&lang, "deposit-cancel"), "❌ Операция отменена");
    }

    #[test]
    fn interpolates_args() {
        let ru = lang_from_code("ru");
        let mut args = FluentArgs::new();
        args.set("casino", "Melbet");
        let text = t_args(&ru, "deposit-enter-account-id", &args);
        assert!(text.contains("Melbet"));
    }

    #[test]
    fn normalizes_language_variants() {
        assert_eq!(is_language_supported("ru-RU"), Some("ru"));
        assert_eq!(is_language_supported("KY"), Some("ky"));
        assert_eq!(is_language_supported("en"), None);
    }
}
