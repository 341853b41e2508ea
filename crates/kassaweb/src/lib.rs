//! Kassaweb — the payment web relay.
//!
//! Serves the payment page opened from the bot's deep link, turns remote
//! QR hashes into scannable images, and forwards the "I paid" confirmation
//! to the remote API.

pub mod qr;
pub mod routes;

pub use routes::{create_router, AppState};
