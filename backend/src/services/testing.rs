//! In-memory doubles for the narrow collaborator traits, shared by the
//! service tests.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;

use crate::db::connections::{ConnectionLedger, LedgerError};
use crate::db::users::UserDirectory;
use crate::models::{ConnectOutgoingMessage, Connection, User};
use crate::services::dispatch::MessageDispatcher;

fn row(requesting_user_id: i64, to_be_connected_with_user_id: i64) -> Connection {
    Connection {
        id: Uuid::new_v4(),
        requesting_user_id,
        to_be_connected_with_user_id,
        created_at: Utc::now(),
    }
}

#[derive(Default)]
pub struct FakeLedger {
    rows: Mutex<Vec<Connection>>,
    lookups: AtomicUsize,
    inserts: AtomicUsize,
    deletes: AtomicUsize,
    fail_inserts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl FakeLedger {
    pub fn seed(&self, requesting_user_id: i64, to_be_connected_with_user_id: i64) {
        self.rows
            .lock()
            .unwrap()
            .push(row(requesting_user_id, to_be_connected_with_user_id));
    }

    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<Connection> {
        self.rows.lock().unwrap().clone()
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn contains_pair(&self, user_id_a: i64, user_id_b: i64) -> bool {
        self.rows.lock().unwrap().iter().any(|c| {
            (c.requesting_user_id == user_id_a && c.to_be_connected_with_user_id == user_id_b)
                || (c.requesting_user_id == user_id_b
                    && c.to_be_connected_with_user_id == user_id_a)
        })
    }
}

impl ConnectionLedger for FakeLedger {
    async fn insert(
        &self,
        requesting_user_id: i64,
        to_be_connected_with_user_id: i64,
    ) -> Result<Connection, LedgerError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(LedgerError::Database(sqlx::Error::PoolClosed));
        }
        if requesting_user_id == to_be_connected_with_user_id {
            return Err(LedgerError::SelfConnection);
        }
        if self.contains_pair(requesting_user_id, to_be_connected_with_user_id) {
            return Err(LedgerError::Duplicate);
        }
        let connection = row(requesting_user_id, to_be_connected_with_user_id);
        self.rows.lock().unwrap().push(connection.clone());
        Ok(connection)
    }

    async fn find_by_either_ordering(
        &self,
        user_id_a: i64,
        user_id_b: i64,
    ) -> Result<Option<Connection>, LedgerError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| {
                (c.requesting_user_id == user_id_a
                    && c.to_be_connected_with_user_id == user_id_b)
                    || (c.requesting_user_id == user_id_b
                        && c.to_be_connected_with_user_id == user_id_a)
            })
            .cloned())
    }

    async fn find_all_by_target(&self, user_id: i64) -> Result<Vec<Connection>, LedgerError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.to_be_connected_with_user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_by_ordered_pair(
        &self,
        requesting_user_id: i64,
        connected_with_user_id: i64,
    ) -> Result<u64, LedgerError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(LedgerError::Database(sqlx::Error::PoolClosed));
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| {
            !(c.requesting_user_id == requesting_user_id
                && c.to_be_connected_with_user_id == connected_with_user_id)
        });
        Ok((before - rows.len()) as u64)
    }
}

#[derive(Default)]
pub struct FakeUserDirectory {
    users: Mutex<HashMap<i64, User>>,
}

impl FakeUserDirectory {
    pub fn with_users(entries: &[(i64, &str)]) -> Self {
        let directory = Self::default();
        for (id, username) in entries {
            directory.users.lock().unwrap().insert(
                *id,
                User {
                    id: *id,
                    username: username.to_string(),
                    phone: "+15555550100".to_string(),
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                },
            );
        }
        directory
    }
}

impl UserDirectory for FakeUserDirectory {
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, LedgerError> {
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }
}

#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<(i64, String, ConnectOutgoingMessage)>>,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<(i64, String, ConnectOutgoingMessage)> {
        self.sent.lock().unwrap().clone()
    }
}

impl MessageDispatcher for RecordingDispatcher {
    async fn send_to_user(
        &self,
        recipient_user_id: i64,
        destination: &str,
        message: ConnectOutgoingMessage,
    ) {
        self.sent
            .lock()
            .unwrap()
            .push((recipient_user_id, destination.to_string(), message));
    }
}
