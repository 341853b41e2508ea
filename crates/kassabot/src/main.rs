use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dptree;
use teloxide::prelude::*;

use kassabot::bot::{create_bot, setup_bot_commands};
use kassabot::deposit::DepositState;
use kassabot::schema::{schema, HandlerDeps};
use kassabot::session::LangStore;
use kassacore::api::ApiClient;
use kassacore::{config, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    logging::init_logger()?;

    let bot = create_bot()?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {e}");
    }

    let api = Arc::new(ApiClient::from_env()?);
    let deps = HandlerDeps::new(api, Arc::new(LangStore::new()));

    log::info!("Starting kassabot (API: {})", config::API_BASE_URL.as_str());

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![InMemStorage::<DepositState>::new(), deps])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
