//! Per-user language store.
//!
//! The deposit dialogue state lives in teloxide's `InMemStorage`; the chosen
//! language is the one session field that outlives a single flow, so it gets
//! its own map. Created on first message, keyed by Telegram user id.

use dashmap::DashMap;
use teloxide::types::{Message, User};
use unic_langid::LanguageIdentifier;

use kassacore::i18n;

#[derive(Debug, Default)]
pub struct LangStore {
    langs: DashMap<u64, LanguageIdentifier>,
}

impl LangStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit selection from the language menu.
    pub fn set(&self, user_id: u64, code: &str) {
        self.langs.insert(user_id, i18n::lang_from_code(code));
    }

    /// Resolves a user's language, seeding the store from the Telegram
    /// client locale on first contact.
    pub fn resolve(&self, user: &User) -> LanguageIdentifier {
        if let Some(lang) = self.langs.get(&user.id.0) {
            return lang.clone();
        }
        let lang = user
            .language_code
            .as_deref()
            .and_then(i18n::is_language_supported)
            .map(i18n::lang_from_code)
            .unwrap_or_else(|| i18n::lang_from_code("ru"));
        self.langs.insert(user.id.0, lang.clone());
        lang
    }

    /// Language for the sender of a message; default when the message has
    /// no sender (channel posts and the like).
    pub fn resolve_msg(&self, msg: &Message) -> LanguageIdentifier {
        msg.from
            .as_ref()
            .map(|user| self.resolve(user))
            .unwrap_or_else(|| i18n::lang_from_code("ru"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_selection_wins_over_client_locale() {
        let store = LangStore::new();
        store.set(7, "ky");
        let lang: LanguageIdentifier = "ky".parse().unwrap();
        assert_eq!(store.langs.get(&7).unwrap().clone(), lang);
    }

    #[test]
    fn unsupported_selection_falls_back_to_russian() {
        let store = LangStore::new();
        store.set(7, "de");
        let ru: LanguageIdentifier = "ru".parse().unwrap();
        assert_eq!(store.langs.get(&7).unwrap().clone(), ru);
    }
}
