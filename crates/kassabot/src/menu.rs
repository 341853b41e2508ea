//! Keyboard builders and the main menu.

use fluent_templates::fluent_bundle::FluentArgs;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};
use unic_langid::LanguageIdentifier;

use kassacore::api::PaymentSettings;
use kassacore::catalog;
use kassacore::config::contacts;
use kassacore::i18n;

/// Reply keyboard shown with the main menu.
pub fn main_menu_keyboard(lang: &LanguageIdentifier) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(i18n::t(lang, "menu-deposit-button"))]])
        .resize_keyboard()
}

/// Reply keyboard with the single cancel button, shown during a flow.
pub fn cancel_keyboard(lang: &LanguageIdentifier) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(i18n::t(lang, "deposit-cancel"))]])
        .resize_keyboard()
}

/// Inline keyboard of enabled casinos, two buttons per row.
/// Returns `None` when the settings disable every catalog entry.
pub fn casino_keyboard(settings: &PaymentSettings) -> Option<InlineKeyboardMarkup> {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    let mut row: Vec<InlineKeyboardButton> = Vec::new();

    for casino in catalog::CASINOS {
        if !settings.casino_enabled(casino.id) {
            continue;
        }
        row.push(InlineKeyboardButton::callback(
            casino.name,
            format!("casino_{}", casino.id),
        ));
        if row.len() == 2 {
            rows.push(std::mem::take(&mut row));
        }
    }
    if !row.is_empty() {
        rows.push(row);
    }

    if rows.is_empty() {
        None
    } else {
        Some(InlineKeyboardMarkup::new(rows))
    }
}

/// Inline keyboard for language selection.
pub fn language_keyboard() -> InlineKeyboardMarkup {
    let buttons = i18n::SUPPORTED_LANGS
        .iter()
        .map(|(code, name)| vec![InlineKeyboardButton::callback(*name, format!("lang_{code}"))])
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(buttons)
}

/// Sends the welcome text with the main menu keyboard.
pub async fn show_main_menu(
    bot: &Bot,
    chat_id: ChatId,
    lang: &LanguageIdentifier,
) -> ResponseResult<Message> {
    let mut args = FluentArgs::new();
    args.set("channel", contacts::CHANNEL);
    args.set("support", contacts::SUPPORT);

    bot.send_message(chat_id, i18n::t_args(lang, "start-welcome", &args))
        .reply_markup(main_menu_keyboard(lang))
        .await
}
