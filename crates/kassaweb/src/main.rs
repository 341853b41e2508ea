use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;

use kassacore::api::ApiClient;
use kassacore::{config, logging};
use kassaweb::routes::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    logging::init_logger()?;

    let state = AppState {
        api: Arc::new(ApiClient::from_env()?),
        images_dir: routes::resolve_images_dir(),
    };
    let app = routes::create_router(state);

    let addr = format!("0.0.0.0:{}", *config::PORT);
    log::info!("Starting payment relay on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
