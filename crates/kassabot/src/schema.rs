//! Dispatcher schema and handler dependencies.
//!
//! The same handler tree is used in production and in tests. Dialogue
//! branches only match their own state variant, which is what enforces the
//! step ordering of the deposit flow.

use std::sync::Arc;

use teloxide::dispatching::dialogue::{self, InMemStorage};
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;

use kassacore::api::ApiClient;
use kassacore::i18n;

use crate::bot::Command;
use crate::deposit::{self, DepositState};
use crate::menu;
use crate::session::LangStore;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;

/// Dependencies injected into every handler.
#[derive(Clone)]
pub struct HandlerDeps {
    pub api: Arc<ApiClient>,
    pub sessions: Arc<LangStore>,
}

impl HandlerDeps {
    pub fn new(api: Arc<ApiClient>, sessions: Arc<LangStore>) -> Self {
        Self { api, sessions }
    }
}

/// Builds the handler tree for the dispatcher.
pub fn schema() -> UpdateHandler<HandlerError> {
    use teloxide::dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(handle_start_command))
        .branch(case![Command::Language].endpoint(handle_language_command));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        // The deposit button restarts the flow from any step.
        .branch(
            dptree::filter(|msg: Message| {
                msg.text().is_some_and(deposit::is_deposit_trigger)
            })
            .endpoint(deposit::start),
        )
        .branch(
            dptree::filter(|msg: Message| msg.text().is_some_and(deposit::is_cancel_text))
                .endpoint(deposit::cancel),
        )
        .branch(
            case![DepositState::AwaitingAccountId { casino_id, casino_name }]
                .endpoint(deposit::account_id_received),
        )
        .branch(
            case![DepositState::AwaitingAmount { casino_id, casino_name, account_id }]
                .endpoint(deposit::amount_received),
        );

    let callback_handler = Update::filter_callback_query()
        .branch(
            dptree::filter(|q: CallbackQuery| {
                q.data.as_deref().is_some_and(|d| d.starts_with("lang_"))
            })
            .endpoint(handle_language_callback),
        )
        .branch(case![DepositState::AwaitingCasino].endpoint(deposit::casino_selected));

    dialogue::enter::<Update, InMemStorage<DepositState>, DepositState, _>()
        .branch(message_handler)
        .branch(callback_handler)
}

async fn handle_start_command(bot: Bot, deps: HandlerDeps, msg: Message) -> HandlerResult {
    let lang = deps.sessions.resolve_msg(&msg);
    menu::show_main_menu(&bot, msg.chat.id, &lang).await?;
    Ok(())
}

async fn handle_language_command(bot: Bot, deps: HandlerDeps, msg: Message) -> HandlerResult {
    let lang = deps.sessions.resolve_msg(&msg);
    bot.send_message(msg.chat.id, i18n::t(&lang, "start-choose-language"))
        .reply_markup(menu::language_keyboard())
        .await?;
    Ok(())
}

async fn handle_language_callback(bot: Bot, deps: HandlerDeps, q: CallbackQuery) -> HandlerResult {
    let Some(code) = q.data.as_deref().and_then(|d| d.strip_prefix("lang_")) else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    deps.sessions.set(q.from.id.0, code);
    let lang = i18n::lang_from_code(code);

    bot.answer_callback_query(q.id.clone())
        .text(i18n::t(&lang, "start-language-saved"))
        .await?;

    if let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) {
        menu::show_main_menu(&bot, chat_id, &lang).await?;
    }
    Ok(())
}
