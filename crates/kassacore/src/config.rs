use once_cell::sync::Lazy;
use std::env;

/// Configuration constants for the relay services.
///
/// Everything here is read once from the environment at first access;
/// binaries load `.env` via dotenvy before touching any of these.

/// Telegram bot token. Empty string means "not configured"; the bot
/// refuses to start in that case rather than panicking here.
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| env::var("BOT_TOKEN").unwrap_or_default());

/// Base URL of the payment/admin API, without trailing slash.
pub static API_BASE_URL: Lazy<String> =
    Lazy::new(|| env::var("API_BASE_URL").unwrap_or_else(|_| api::PRODUCTION_BASE_URL.to_string()));

/// Deployment mode of the configured API endpoint.
///
/// `local` turns on the probe-then-fall-back behavior of the API client;
/// anything else targets `API_BASE_URL` directly. This replaces the old
/// "does the URL start with http://localhost" check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMode {
    Local,
    Production,
}

pub static API_MODE: Lazy<ApiMode> = Lazy::new(|| {
    match env::var("API_MODE").unwrap_or_default().to_lowercase().as_str() {
        "local" => ApiMode::Local,
        _ => ApiMode::Production,
    }
});

/// Accept invalid TLS certificates on outbound API calls.
///
/// The internal API deployment runs on a self-signed certificate; set
/// API_ACCEPT_INVALID_CERTS=1 to talk to it. Off by default, and the client
/// logs a warning when it is engaged.
pub static API_ACCEPT_INVALID_CERTS: Lazy<bool> =
    Lazy::new(|| matches!(env::var("API_ACCEPT_INVALID_CERTS").as_deref(), Ok("1") | Ok("true")));

/// Public URL of the payment site, used to build WebApp deep links.
///
/// Telegram requires HTTPS for WebApp URLs, so a configured http:// URL is
/// rewritten: localhost falls back to the production host, anything else is
/// upgraded in place.
pub static PAYMENT_SITE_URL: Lazy<String> = Lazy::new(|| {
    let configured =
        env::var("PAYMENT_SITE_URL").unwrap_or_else(|_| payment::PRODUCTION_SITE_URL.to_string());
    if let Some(rest) = configured.strip_prefix("http://") {
        if rest.starts_with("localhost") || rest.starts_with("127.0.0.1") {
            payment::PRODUCTION_SITE_URL.to_string()
        } else {
            format!("https://{rest}")
        }
    } else {
        configured
    }
});

/// Listen port for the payment web relay.
pub static PORT: Lazy<u16> = Lazy::new(|| {
    env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3003)
});

/// Directory holding bank icon images, shared with the admin panel.
/// `None` when unset; the icons route then degrades to 404.
pub static IMAGES_DIR: Lazy<Option<String>> = Lazy::new(|| env::var("IMAGES_DIR").ok());

/// Remote API endpoints and fallback policy.
pub mod api {
    use std::time::Duration;

    /// Fixed production API base, used as the fallback target in local mode.
    pub const PRODUCTION_BASE_URL: &str = "https://fqxgmrzplndwsyvkeu.ru/api";

    /// Timeout for the optional local-endpoint probe. The fallback call and
    /// every production call run with the client default (unbounded).
    pub const LOCAL_PROBE_TIMEOUT_SECS: u64 = 2;

    pub fn local_probe_timeout() -> Duration {
        Duration::from_secs(LOCAL_PROBE_TIMEOUT_SECS)
    }
}

/// Deposit amount limits, in soms.
pub mod limits {
    pub const DEPOSIT_MIN: f64 = 100.0;
    pub const DEPOSIT_MAX: f64 = 100_000.0;
}

/// Payment page behavior.
pub mod payment {
    use std::time::Duration;

    /// Production payment site host (HTTPS, WebApp-compatible).
    pub const PRODUCTION_SITE_URL: &str = "https://gldwueprxkmbtqsnva.ru";

    /// How long a rendered payment page stays valid; drives the countdown.
    pub const PAGE_TTL_SECS: u64 = 300;

    pub fn page_ttl() -> Duration {
        Duration::from_secs(PAGE_TTL_SECS)
    }
}

/// Support and announcement contacts shown in the bot.
pub mod contacts {
    pub const CHANNEL: &str = "@bingokg_news";
    pub const SUPPORT: &str = "@bingokg_boss";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_limits_are_sane() {
        assert!(limits::DEPOSIT_MIN < limits::DEPOSIT_MAX);
        assert!(limits::DEPOSIT_MIN > 0.0);
    }

    #[test]
    fn local_probe_timeout_is_short() {
        assert!(api::local_probe_timeout().as_secs() <= 5);
    }
}
