use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::constants::{QR_CODE_CACHE_NAMESPACE, QR_CODE_RANDOM_BYTES, QR_CODE_TTL_SECONDS};
use crate::services::cache::CodeCache;

/// Generates, stores, and validates the ephemeral pairing code a user
/// presents as a QR code. At most one live code exists per owner; generating
/// a new one overwrites the old.
#[derive(Debug)]
pub struct QrCodeService<C> {
    cache: Arc<C>,
    ttl: Duration,
}

impl<C> Clone for QrCodeService<C> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            ttl: self.ttl,
        }
    }
}

impl<C: CodeCache> QrCodeService<C> {
    pub fn new(cache: Arc<C>) -> Self {
        Self {
            cache,
            ttl: Duration::from_secs(QR_CODE_TTL_SECONDS),
        }
    }

    #[cfg(test)]
    pub fn with_ttl(cache: Arc<C>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Produces a fresh opaque code for `user_id` and stores it under the QR
    /// code namespace. Cache write only; nothing is persisted.
    pub async fn generate_and_store(&self, user_id: i64) -> String {
        let mut bytes = [0u8; QR_CODE_RANDOM_BYTES];
        rand::rng().fill(&mut bytes);
        let code = hex::encode(bytes);

        self.cache
            .put(
                QR_CODE_CACHE_NAMESPACE,
                &user_id.to_string(),
                &code,
                self.ttl,
            )
            .await;

        code
    }

    /// The current live code for `user_id`, if any.
    pub async fn retrieve(&self, user_id: i64) -> Option<String> {
        self.cache
            .get(QR_CODE_CACHE_NAMESPACE, &user_id.to_string())
            .await
    }

    /// True iff a live, non-empty code exists for `owner_user_id` and exactly
    /// equals `provided`. An empty or absent provided code always fails.
    pub async fn validate(&self, provided: &str, owner_user_id: i64) -> bool {
        if provided.is_empty() {
            return false;
        }
        match self.retrieve(owner_user_id).await {
            Some(cached) => !cached.is_empty() && cached == provided,
            None => false,
        }
    }
}
