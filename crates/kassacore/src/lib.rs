//! Core library for Kassa — the casino top-up relay.
//!
//! Holds everything shared between the Telegram bot and the payment web
//! relay: configuration, the static casino/bank catalogs, the remote
//! payment API client, error types, and localization. Deliberately free of
//! Telegram and HTTP-server code so both binaries can depend on it.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod i18n;
pub mod logging;

pub use api::ApiClient;
pub use error::{AppError, AppResult};
