pub mod connect;
pub mod sms;

use sqlx::PgPool;
use std::sync::Arc;

use crate::Config;
use crate::db::{PgConnectionLedger, PgUserDirectory};
use crate::services::{
    ConnectService, ConnectionGuard, HttpSmsSender, InMemoryCodeCache, QrCodeService,
    QueueDispatcher, SmsChallengeService,
};

pub use connect::{
    connect_message, get_all_connections, get_qr_code, poll_messages, remove_connection,
    validate_connection,
};
pub use sms::{send_sms_challenge, verify_sms_challenge};

pub type AppConnectService =
    ConnectService<PgConnectionLedger, PgUserDirectory, InMemoryCodeCache, QueueDispatcher>;
pub type AppSmsService = SmsChallengeService<InMemoryCodeCache, HttpSmsSender>;

/// Shared handler state: the protocol services wired to their Postgres,
/// cache, and dispatch collaborators.
#[derive(Clone)]
pub struct AppState {
    pub connect: Arc<AppConnectService>,
    pub guard: Arc<ConnectionGuard<PgConnectionLedger>>,
    pub qr_codes: QrCodeService<InMemoryCodeCache>,
    pub dispatcher: Arc<QueueDispatcher>,
    pub sms: Arc<AppSmsService>,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let ledger = Arc::new(PgConnectionLedger::new(pool.clone()));
        let users = Arc::new(PgUserDirectory::new(pool));
        let cache = Arc::new(InMemoryCodeCache::new());
        let dispatcher = Arc::new(QueueDispatcher::new());
        let qr_codes = QrCodeService::new(cache.clone());

        let connect = Arc::new(ConnectService::new(
            ledger.clone(),
            users,
            qr_codes.clone(),
            dispatcher.clone(),
        ));
        let guard = Arc::new(ConnectionGuard::new(ledger));
        let sms_sender = Arc::new(HttpSmsSender::new(
            config.sms_gateway_url.clone(),
            config.sms_api_key.clone(),
        ));
        let sms = Arc::new(SmsChallengeService::new(cache, sms_sender));

        Self {
            connect,
            guard,
            qr_codes,
            dispatcher,
            sms,
        }
    }
}
