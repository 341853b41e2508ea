//! Bot initialization and command definitions.

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use kassacore::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Команды:")]
pub enum Command {
    #[command(description = "главное меню")]
    Start,
    #[command(description = "сменить язык")]
    Language,
}

/// Creates the Bot instance from the configured token.
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = config::BOT_TOKEN.as_str();
    if token.is_empty() {
        return Err(anyhow::anyhow!("BOT_TOKEN environment variable not set"));
    }
    Ok(Bot::new(token))
}

/// Registers the command list in the Telegram UI.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "главное меню"),
        BotCommand::new("language", "сменить язык"),
    ])
    .await?;

    Ok(())
}
