//! The deposit conversation flow.
//!
//! A linear dialogue: pick a casino, enter the account id, enter the
//! amount, receive a payment deep link. The dialogue state enum carries the
//! data accumulated so far, so a message arriving out of step order simply
//! matches no branch. Cancel works from any step and returns to the main
//! menu. No remote request is created here: that happens on the payment
//! page when the user confirms.

use fluent_templates::fluent_bundle::FluentArgs;
use rand::Rng;
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, WebAppInfo};
use unic_langid::LanguageIdentifier;
use url::Url;

use kassacore::catalog;
use kassacore::config::{self, limits};
use kassacore::i18n;

use crate::menu;
use crate::schema::{HandlerDeps, HandlerResult};

/// Dialogue state for the deposit flow. The variant is the step; the fields
/// are the session data collected so far.
#[derive(Clone, Debug, Default)]
pub enum DepositState {
    #[default]
    Idle,
    AwaitingCasino,
    AwaitingAccountId {
        casino_id: String,
        casino_name: String,
    },
    AwaitingAmount {
        casino_id: String,
        casino_name: String,
        account_id: String,
    },
    /// Terminal for the conversation, but the session sticks around: the
    /// user stays in the bot while the payment page is open.
    LinkSent {
        casino_id: String,
        account_id: String,
        amount: f64,
    },
}

pub type DepositDialogue = Dialogue<DepositState, InMemStorage<DepositState>>;

/// True when the text is the deposit menu button in any supported language.
pub fn is_deposit_trigger(text: &str) -> bool {
    i18n::SUPPORTED_LANGS
        .iter()
        .any(|&(code, _)| i18n::t(&i18n::lang_from_code(code), "menu-deposit-button") == text)
}

/// True when the text is the cancel button in any supported language.
pub fn is_cancel_text(text: &str) -> bool {
    i18n::SUPPORTED_LANGS
        .iter()
        .any(|&(code, _)| i18n::t(&i18n::lang_from_code(code), "deposit-cancel") == text)
}

/// Non-empty, ASCII digits only.
pub fn is_valid_account_id(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// Parses a user-entered amount: whitespace (including thousands spacing)
/// is stripped, a comma is accepted as the decimal separator.
pub fn parse_amount(text: &str) -> Option<f64> {
    let normalized: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let normalized = normalized.replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse().ok()
}

/// Adds the anti-collision fraction: a uniform random number of cents in
/// `[0.01, 0.99]`. Downstream reconciliation matches payments by this
/// near-unique amount.
pub fn with_random_cents(amount: f64) -> f64 {
    let cents = rand::rng().random_range(1..=99_u32);
    amount + f64::from(cents) / 100.0
}

/// Builds the payment deep link. Optional profile fields are only appended
/// when present and non-empty.
#[allow(clippy::too_many_arguments)]
pub fn build_payment_link(
    base: &str,
    amount: f64,
    user_id: u64,
    casino_id: &str,
    account_id: &str,
    username: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    url.set_path("/pay");
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("amount", &format!("{amount:.2}"));
        pairs.append_pair("user_id", &user_id.to_string());
        pairs.append_pair("casino_id", casino_id);
        pairs.append_pair("account_id", account_id);
        for (key, value) in [
            ("username", username),
            ("first_name", first_name),
            ("last_name", last_name),
        ] {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                pairs.append_pair(key, value);
            }
        }
    }
    Ok(url)
}

/// Entry point: the deposit menu button. Gated by the freshly-fetched
/// payment settings; fails closed on pause or disabled deposits.
pub async fn start(
    bot: Bot,
    dialogue: DepositDialogue,
    deps: HandlerDeps,
    msg: Message,
) -> HandlerResult {
    let lang = deps.sessions.resolve_msg(&msg);
    let settings = deps.api.payment_settings().await;

    if settings.pause {
        let text = settings
            .maintenance_message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| i18n::t(&lang, "bot-paused"));
        bot.send_message(msg.chat.id, text).await?;
        return Ok(());
    }

    if !settings.deposits_enabled() {
        bot.send_message(msg.chat.id, i18n::t(&lang, "deposit-disabled")).await?;
        return Ok(());
    }

    let Some(keyboard) = menu::casino_keyboard(&settings) else {
        bot.send_message(msg.chat.id, i18n::t(&lang, "deposit-no-casinos")).await?;
        return Ok(());
    };

    bot.send_message(msg.chat.id, i18n::t(&lang, "deposit-select-casino"))
        .reply_markup(keyboard)
        .await?;
    dialogue.update(DepositState::AwaitingCasino).await?;
    Ok(())
}

/// Casino chosen from the inline keyboard.
pub async fn casino_selected(
    bot: Bot,
    dialogue: DepositDialogue,
    deps: HandlerDeps,
    q: CallbackQuery,
) -> HandlerResult {
    let Some(casino_id) = q.data.as_deref().and_then(|d| d.strip_prefix("casino_")) else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let casino_id = casino_id.to_string();
    let casino_name = catalog::casino_name(&casino_id).to_string();
    let lang = deps.sessions.resolve(&q.from);

    let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    // Clear the selection keyboard; the message may already be gone.
    if let Some(message_id) = q.message.as_ref().map(|m| m.id()) {
        let _ = bot.delete_message(chat_id, message_id).await;
    }

    let mut args = FluentArgs::new();
    args.set("casino", casino_name.as_str());
    let prompt = i18n::t_args(&lang, "deposit-enter-account-id", &args);

    // Casino card image lives beside the binary, named by casino id.
    let photo_path = std::path::PathBuf::from(format!("{casino_id}.jpg"));
    if photo_path.exists() {
        bot.send_photo(chat_id, InputFile::file(photo_path))
            .caption(prompt)
            .reply_markup(menu::cancel_keyboard(&lang))
            .await?;
    } else {
        bot.send_message(chat_id, prompt)
            .reply_markup(menu::cancel_keyboard(&lang))
            .await?;
    }

    dialogue
        .update(DepositState::AwaitingAccountId { casino_id, casino_name })
        .await?;
    bot.answer_callback_query(q.id).await?;
    Ok(())
}

/// Account id entered as text.
pub async fn account_id_received(
    bot: Bot,
    dialogue: DepositDialogue,
    deps: HandlerDeps,
    msg: Message,
    (casino_id, casino_name): (String, String),
) -> HandlerResult {
    let lang = deps.sessions.resolve_msg(&msg);
    let account_id = msg.text().unwrap_or_default().trim().to_string();

    if !is_valid_account_id(&account_id) {
        bot.send_message(msg.chat.id, i18n::t(&lang, "deposit-invalid-account-id")).await?;
        return Ok(());
    }

    let mut args = FluentArgs::new();
    args.set("min", format!("{:.0}", limits::DEPOSIT_MIN));
    args.set("max", format!("{:.0}", limits::DEPOSIT_MAX));
    bot.send_message(msg.chat.id, i18n::t_args(&lang, "deposit-enter-amount", &args))
        .reply_markup(menu::cancel_keyboard(&lang))
        .await?;

    dialogue
        .update(DepositState::AwaitingAmount { casino_id, casino_name, account_id })
        .await?;
    Ok(())
}

/// Amount entered as text. Validation errors re-prompt in place; anything
/// unexpected resets the whole session.
pub async fn amount_received(
    bot: Bot,
    dialogue: DepositDialogue,
    deps: HandlerDeps,
    msg: Message,
    (casino_id, casino_name, account_id): (String, String, String),
) -> HandlerResult {
    let lang = deps.sessions.resolve_msg(&msg);

    let outcome = handle_amount(
        &bot,
        &dialogue,
        &msg,
        &lang,
        &casino_id,
        &casino_name,
        &account_id,
    )
    .await;

    if let Err(e) = outcome {
        // Fail-safe reset, not a retry: the session is gone.
        log::error!("deposit amount step failed for chat {}: {e}", msg.chat.id);
        let _ = bot.send_message(msg.chat.id, i18n::t(&lang, "error-generic")).await;
        let _ = dialogue.exit().await;
        let _ = menu::show_main_menu(&bot, msg.chat.id, &lang).await;
    }
    Ok(())
}

async fn handle_amount(
    bot: &Bot,
    dialogue: &DepositDialogue,
    msg: &Message,
    lang: &LanguageIdentifier,
    casino_id: &str,
    casino_name: &str,
    account_id: &str,
) -> HandlerResult {
    let text = msg.text().unwrap_or_default();

    let amount = parse_amount(text);
    let amount = match amount {
        Some(a) if (limits::DEPOSIT_MIN..=limits::DEPOSIT_MAX).contains(&a) => a,
        _ => {
            let mut args = FluentArgs::new();
            args.set("min", format!("{:.0}", limits::DEPOSIT_MIN));
            args.set("max", format!("{:.0}", limits::DEPOSIT_MAX));
            bot.send_message(msg.chat.id, i18n::t_args(lang, "deposit-invalid-amount", &args))
                .await?;
            return Ok(());
        }
    };

    let final_amount = with_random_cents(amount);
    let from = msg.from.as_ref();
    let user_id = from.map(|u| u.id.0).unwrap_or_default();

    let link = build_payment_link(
        &config::PAYMENT_SITE_URL,
        final_amount,
        user_id,
        casino_id,
        account_id,
        from.and_then(|u| u.username.as_deref()),
        from.map(|u| u.first_name.as_str()),
        from.and_then(|u| u.last_name.as_deref()),
    )?;

    let mut args = FluentArgs::new();
    args.set("amount", format!("{final_amount:.2}"));
    args.set("casino", casino_name);
    args.set("account", account_id);

    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::web_app(
        i18n::t(lang, "deposit-pay-button"),
        WebAppInfo { url: link },
    )]]);

    bot.send_message(msg.chat.id, i18n::t_args(lang, "deposit-go-to-payment", &args))
        .reply_markup(keyboard)
        .await?;

    // The session persists: the user returns to the menu only when the
    // payment page closes.
    dialogue
        .update(DepositState::LinkSent {
            casino_id: casino_id.to_string(),
            account_id: account_id.to_string(),
            amount: final_amount,
        })
        .await?;
    Ok(())
}

/// Cancel from any step: drop the session, back to the main menu.
pub async fn cancel(
    bot: Bot,
    dialogue: DepositDialogue,
    deps: HandlerDeps,
    msg: Message,
) -> HandlerResult {
    let lang = deps.sessions.resolve_msg(&msg);
    dialogue.exit().await?;
    menu::show_main_menu(&bot, msg.chat.id, &lang).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_plain_and_comma_amounts() {
        assert_eq!(parse_amount("500"), Some(500.0));
        assert_eq!(parse_amount("500.25"), Some(500.25));
        assert_eq!(parse_amount("500,25"), Some(500.25));
        assert_eq!(parse_amount("  750 "), Some(750.0));
    }

    #[test]
    fn parses_spaced_thousands_with_comma_separator() {
        assert_eq!(parse_amount("1 000,50"), Some(1000.50));
        assert_eq!(parse_amount("10 000"), Some(10000.0));
    }

    #[test]
    fn rejects_garbage_amounts() {
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("12,34,56"), None);
        assert_eq!(parse_amount("1000 сом"), None);
    }

    #[test]
    fn account_id_must_be_digits_only() {
        assert!(is_valid_account_id("123456"));
        assert!(!is_valid_account_id(""));
        assert!(!is_valid_account_id("12a34"));
        assert!(!is_valid_account_id("12 34"));
        assert!(!is_valid_account_id("-123"));
    }

    #[test]
    fn cents_fraction_stays_in_range() {
        for _ in 0..200 {
            let amount = with_random_cents(1000.50);
            let fraction = amount - 1000.50;
            assert!(fraction > 0.005 && fraction < 0.995, "fraction {fraction} out of range");
        }
    }

    #[test]
    fn deposit_and_cancel_triggers_match_both_languages() {
        assert!(is_deposit_trigger("💰 Пополнить"));
        assert!(is_deposit_trigger("💰 Толтуруу"));
        assert!(!is_deposit_trigger("hello"));

        assert!(is_cancel_text("❌ Операция отменена"));
        assert!(is_cancel_text("❌ Аракет жокко чыгарылды"));
        assert!(!is_cancel_text("cancel"));
    }

    #[test]
    fn payment_link_carries_required_and_present_optional_params() {
        let url = build_payment_link(
            "https://pay.example",
            1000.57,
            42,
            "melbet",
            "123456",
            Some("durov"),
            Some("Pavel"),
            None,
        )
        .unwrap();

        assert_eq!(url.path(), "/pay");
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["amount"], "1000.57");
        assert_eq!(pairs["user_id"], "42");
        assert_eq!(pairs["casino_id"], "melbet");
        assert_eq!(pairs["account_id"], "123456");
        assert_eq!(pairs["username"], "durov");
        assert_eq!(pairs["first_name"], "Pavel");
        assert!(!pairs.contains_key("last_name"));
    }

    #[test]
    fn payment_link_omits_empty_profile_fields() {
        let url = build_payment_link(
            "https://pay.example",
            250.33,
            7,
            "1win",
            "99",
            None,
            Some(""),
            None,
        )
        .unwrap();

        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs.len(), 4);
        assert!(!pairs.contains_key("username"));
        assert!(!pairs.contains_key("first_name"));
    }

    #[test]
    fn valid_amount_with_cents_lands_in_the_documented_window() {
        // "1 000,50" with DEPOSIT_MAX = 100000: final amount in [1000.51, 1000.99]
        let parsed = parse_amount("1 000,50").unwrap();
        assert!((limits::DEPOSIT_MIN..=limits::DEPOSIT_MAX).contains(&parsed));

        for _ in 0..100 {
            let final_amount = with_random_cents(parsed);
            assert!(final_amount > 1000.505 && final_amount < 1000.995);
        }
    }

    #[test]
    fn out_of_range_amounts_are_rejected_by_the_limit_check() {
        for text in ["99.99", "0", "100001", "-500"] {
            let amount = parse_amount(text).unwrap();
            assert!(!(limits::DEPOSIT_MIN..=limits::DEPOSIT_MAX).contains(&amount));
        }
        // Boundaries are inclusive
        for text in ["100", "100000"] {
            let amount = parse_amount(text).unwrap();
            assert!((limits::DEPOSIT_MIN..=limits::DEPOSIT_MAX).contains(&amount));
        }
    }
}
