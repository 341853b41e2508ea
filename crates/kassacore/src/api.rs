//! Client for the remote payment/admin API.
//!
//! Three operations: create a payment request, generate a QR code, fetch
//! payment settings. Each call is a fresh one-shot request. In local mode
//! `create_request` and `payment_settings` probe the configured endpoint
//! with a short timeout and fall back to the fixed production base on any
//! failure; one shot, no backoff. `generate_qr` never falls back.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{self, ApiMode};
use crate::error::{AppError, AppResult};

/// Kind of request being created against the remote ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Deposit,
    Withdraw,
}

/// Payload for `POST {base}/payment`.
///
/// Optional fields are omitted from the JSON entirely when absent — the
/// remote API distinguishes "not sent" from "sent as null".
#[derive(Debug, Clone, Serialize)]
pub struct CreateRequest {
    pub telegram_user_id: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmaker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawal_code: Option<String>,
}

impl CreateRequest {
    pub fn new(telegram_user_id: impl Into<String>, request_type: RequestType, amount: f64) -> Self {
        Self {
            telegram_user_id: telegram_user_id.into(),
            request_type,
            amount,
            bookmaker: None,
            bank: None,
            phone: None,
            account_id: None,
            telegram_username: None,
            telegram_first_name: None,
            telegram_last_name: None,
            receipt_photo: None,
            withdrawal_code: None,
        }
    }
}

/// Response of `POST {base}/payment`. Unknown fields are preserved so the
/// web relay can pass the result through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Response of `POST {base}/public/generate-qr`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_hash: Option<String>,
    #[serde(default)]
    pub all_bank_urls: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Payment settings snapshot from the admin panel.
///
/// The default value means "no settings reachable": not paused, deposits
/// enabled, every casino enabled. Callers never see a fetch error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentSettings {
    #[serde(default)]
    pub pause: bool,
    #[serde(default)]
    pub maintenance_message: Option<String>,
    #[serde(default)]
    pub deposits: DepositsToggle,
    #[serde(default)]
    pub casinos: HashMap<String, bool>,
}

impl PaymentSettings {
    pub fn deposits_enabled(&self) -> bool {
        match &self.deposits {
            DepositsToggle::Flag(enabled) => *enabled,
            DepositsToggle::Detailed { enabled } => *enabled,
        }
    }

    /// Casinos absent from the settings map are enabled.
    pub fn casino_enabled(&self, id: &str) -> bool {
        self.casinos.get(id).copied().unwrap_or(true)
    }
}

/// The admin panel has shipped this field both as a bare bool and as an
/// object with an `enabled` flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DepositsToggle {
    Flag(bool),
    Detailed {
        #[serde(default = "default_true")]
        enabled: bool,
    },
}

impl Default for DepositsToggle {
    fn default() -> Self {
        DepositsToggle::Flag(true)
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct SettingsEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(flatten)]
    settings: PaymentSettings,
}

/// Remote API client. Cheap to clone; the inner reqwest client is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    fallback_url: String,
    mode: ApiMode,
}

impl ApiClient {
    /// Builds a client from the process configuration.
    pub fn from_env() -> AppResult<Self> {
        let mut builder = reqwest::Client::builder();
        if *config::API_ACCEPT_INVALID_CERTS {
            log::warn!("TLS certificate verification is DISABLED for API calls (API_ACCEPT_INVALID_CERTS)");
            builder = builder.danger_accept_invalid_certs(true);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: config::API_BASE_URL.clone(),
            fallback_url: config::api::PRODUCTION_BASE_URL.to_string(),
            mode: *config::API_MODE,
        })
    }

    /// Builds a client against explicit endpoints. Used by tests and by the
    /// web relay when it targets a non-default base.
    pub fn with_endpoints(
        base_url: impl Into<String>,
        fallback_url: impl Into<String>,
        mode: ApiMode,
    ) -> AppResult<Self> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: base_url.into(),
            fallback_url: fallback_url.into(),
            mode,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates a payment or withdrawal request.
    ///
    /// Local mode: probe the configured endpoint with a 2-second timeout,
    /// fall back to production on any failure.
    pub async fn create_request(&self, request: &CreateRequest) -> AppResult<RemoteResult> {
        if self.mode == ApiMode::Local {
            match self.post_payment(&self.base_url, request, true).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    log::warn!("Local API unavailable ({e}), retrying against production");
                }
            }
            return self.post_payment(&self.fallback_url, request, false).await;
        }
        self.post_payment(&self.base_url, request, false).await
    }

    async fn post_payment(
        &self,
        base: &str,
        request: &CreateRequest,
        probe: bool,
    ) -> AppResult<RemoteResult> {
        let mut builder = self.http.post(format!("{base}/payment")).json(request);
        if probe {
            builder = builder.timeout(config::api::local_probe_timeout());
        }
        let response = builder.send().await?;
        if probe && !response.status().is_success() {
            return Err(AppError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }

    /// Generates a QR code for the given amount and bank. Always targets the
    /// configured endpoint; no fallback.
    pub async fn generate_qr(&self, amount: f64, bank: &str) -> AppResult<QrResult> {
        let response = self
            .http
            .post(format!("{}/public/generate-qr", self.base_url))
            .json(&serde_json::json!({ "amount": amount, "bank": bank }))
            .send()
            .await?;
        Ok(response.json().await?)
    }

    /// Fetches the payment settings snapshot.
    ///
    /// Never fails: any transport or parse problem, and any body without
    /// `success: true`, degrades to the all-defaults settings.
    pub async fn payment_settings(&self) -> PaymentSettings {
        match self.fetch_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to fetch payment settings: {e}");
                PaymentSettings::default()
            }
        }
    }

    async fn fetch_settings(&self) -> AppResult<PaymentSettings> {
        let envelope = if self.mode == ApiMode::Local {
            match self.get_settings(&self.base_url, true).await {
                Ok(envelope) => envelope,
                Err(e) => {
                    log::warn!("Local API unavailable ({e}), retrying against production");
                    self.get_settings(&self.fallback_url, false).await?
                }
            }
        } else {
            self.get_settings(&self.base_url, false).await?
        };

        if envelope.success {
            Ok(envelope.settings)
        } else {
            Ok(PaymentSettings::default())
        }
    }

    async fn get_settings(&self, base: &str, probe: bool) -> AppResult<SettingsEnvelope> {
        let mut builder = self.http.get(format!("{base}/public/payment-settings"));
        if probe {
            builder = builder.timeout(config::api::local_probe_timeout());
        }
        let response = builder.send().await?;
        if probe && !response.status().is_success() {
            return Err(AppError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}
