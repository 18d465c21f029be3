use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::constants::{
    SMS_CHALLENGE_CACHE_NAMESPACE, SMS_CHALLENGE_CODE_DIGITS, SMS_CHALLENGE_TTL_SECONDS,
};
use crate::services::cache::CodeCache;

static PHONE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("phone number regex"));

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("invalid phone number: {0}")]
    InvalidPhoneNumber(String),
    #[error("error sending sms challenge to {0}")]
    SendFailed(String),
}

/// Outbound SMS transport. Returns whether the gateway accepted the message.
#[allow(async_fn_in_trait)]
pub trait SmsSender {
    async fn send_sms(&self, phone: &str, body: &str) -> bool;
}

/// Sender that posts to an HTTP SMS gateway. Transport errors are logged and
/// reported as a failed send.
#[derive(Debug, Clone)]
pub struct HttpSmsSender {
    client: reqwest::Client,
    gateway_url: String,
    api_key: String,
}

impl HttpSmsSender {
    pub fn new(gateway_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url,
            api_key,
        }
    }
}

impl SmsSender for HttpSmsSender {
    async fn send_sms(&self, phone: &str, body: &str) -> bool {
        let result = self
            .client
            .post(&self.gateway_url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "to": phone, "body": body }))
            .timeout(Duration::from_secs(10))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::error!("SMS gateway returned status {}", response.status());
                false
            }
            Err(e) => {
                tracing::error!("Failed to reach SMS gateway: {}", e);
                false
            }
        }
    }
}

/// Issues and checks the short-lived numeric challenge codes sent to a phone
/// number during sign-in. Codes live in the same ephemeral cache as pairing
/// codes, under their own namespace keyed by phone number.
pub struct SmsChallengeService<C, S> {
    cache: Arc<C>,
    sender: Arc<S>,
    ttl: Duration,
}

impl<C: CodeCache, S: SmsSender> SmsChallengeService<C, S> {
    pub fn new(cache: Arc<C>, sender: Arc<S>) -> Self {
        Self {
            cache,
            sender,
            ttl: Duration::from_secs(SMS_CHALLENGE_TTL_SECONDS),
        }
    }

    /// Generates a fresh challenge code and sends it to `phone`. The code is
    /// cached only after the gateway accepts the message, so a failed send
    /// leaves no valid code behind.
    pub async fn send_challenge_code(&self, phone: &str) -> Result<String, SmsError> {
        if !PHONE_NUMBER_RE.is_match(phone) {
            return Err(SmsError::InvalidPhoneNumber(phone.to_string()));
        }

        let ceiling = 10u32.pow(SMS_CHALLENGE_CODE_DIGITS);
        let code = format!(
            "{:0width$}",
            rand::rng().random_range(0..ceiling),
            width = SMS_CHALLENGE_CODE_DIGITS as usize
        );

        let body = format!("Your TribeLink challenge code is {}", code);
        if !self.sender.send_sms(phone, &body).await {
            return Err(SmsError::SendFailed(phone.to_string()));
        }

        self.cache
            .put(SMS_CHALLENGE_CACHE_NAMESPACE, phone, &code, self.ttl)
            .await;

        Ok(code)
    }

    /// True iff a live challenge code exists for `phone` and exactly matches.
    pub async fn is_valid_challenge_code(&self, phone: &str, code: &str) -> bool {
        match self.cache.get(SMS_CHALLENGE_CACHE_NAMESPACE, phone).await {
            Some(cached) => !cached.is_empty() && cached == code,
            None => false,
        }
    }
}
