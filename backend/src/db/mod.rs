pub mod connection;
pub mod connections;
pub mod migrations;
pub mod users;

pub use connection::{DatabaseConfig, get_db_pool};
pub use connections::{ConnectionLedger, LedgerError, PgConnectionLedger};
pub use users::{PgUserDirectory, UserDirectory};
