//! Kassabot — the Telegram side of the casino top-up relay.
//!
//! Library form so integration tests can drive the same schema and
//! handlers the binary runs.

pub mod bot;
pub mod deposit;
pub mod menu;
pub mod schema;
pub mod session;
