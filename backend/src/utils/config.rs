use anyhow::Result;
use std::env;

use crate::constants::DEFAULT_SERVER_PORT;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub sms_gateway_url: String,
    pub sms_api_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .unwrap_or(DEFAULT_SERVER_PORT),
            sms_gateway_url: env::var("SMS_GATEWAY_URL")
                .map_err(|_| anyhow::anyhow!("SMS_GATEWAY_URL must be set"))?,
            sms_api_key: env::var("SMS_API_KEY")
                .map_err(|_| anyhow::anyhow!("SMS_API_KEY must be set"))?,
        })
    }
}
