use std::sync::Arc;

use crate::db::connections::{ConnectionLedger, LedgerError};
use crate::models::{Connection, GenericResponse};

/// Pre-write checks for the connect protocol: no self-connections, no
/// requests issued on behalf of someone else, no duplicate rows in either
/// orientation.
#[derive(Debug)]
pub struct ConnectionGuard<L> {
    ledger: Arc<L>,
}

impl<L> Clone for ConnectionGuard<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
        }
    }
}

impl<L: ConnectionLedger> ConnectionGuard<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    pub fn check_self_connection(&self, user_id_a: i64, user_id_b: i64) -> bool {
        user_id_a == user_id_b
    }

    /// A connection between the pair, whichever side initiated it.
    pub async fn check_existing_connection(
        &self,
        user_id_a: i64,
        user_id_b: i64,
    ) -> Result<Option<Connection>, LedgerError> {
        self.ledger
            .find_by_either_ordering(user_id_a, user_id_b)
            .await
    }

    /// Composite check run before establishing intent. `None` means the
    /// request may proceed. The rejection order matters: the two cheap
    /// identity checks run before the ledger lookup, so a trivially invalid
    /// request never touches storage.
    pub async fn validate_connection(
        &self,
        requesting_user_id: i64,
        to_be_connected_with_user_id: i64,
        logged_in_user_id: i64,
    ) -> Result<Option<GenericResponse>, LedgerError> {
        if self.check_self_connection(requesting_user_id, to_be_connected_with_user_id) {
            return Ok(Some(GenericResponse::rejection(format!(
                "User {} may not connect with themselves",
                requesting_user_id
            ))));
        }

        if logged_in_user_id != requesting_user_id {
            return Ok(Some(GenericResponse::rejection(format!(
                "The logged in user ({}) does not match issuing user ({})",
                logged_in_user_id, requesting_user_id
            ))));
        }

        if self
            .check_existing_connection(requesting_user_id, to_be_connected_with_user_id)
            .await?
            .is_some()
        {
            return Ok(Some(GenericResponse::rejection(format!(
                "This connection already exists in reverse between the requesting user {} and the to be connected with user {}",
                requesting_user_id, to_be_connected_with_user_id
            ))));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::FakeLedger;

    #[tokio::test]
    async fn passes_a_well_formed_request() {
        let ledger = Arc::new(FakeLedger::default());
        let guard = ConnectionGuard::new(ledger.clone());

        let outcome = guard.validate_connection(1, 2, 1).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(ledger.lookup_count(), 1);
    }

    #[tokio::test]
    async fn rejects_self_connection_without_touching_storage() {
        let ledger = Arc::new(FakeLedger::default());
        // A matching row exists, but the self-check must win first.
        ledger.seed(2, 2);
        let guard = ConnectionGuard::new(ledger.clone());

        let outcome = guard.validate_connection(2, 2, 2).await.unwrap().unwrap();
        assert!(!outcome.boolean_message);
        assert_eq!(
            outcome.response_message,
            "User 2 may not connect with themselves"
        );
        assert_eq!(ledger.lookup_count(), 0);
    }

    #[tokio::test]
    async fn rejects_identity_mismatch_without_touching_storage() {
        let ledger = Arc::new(FakeLedger::default());
        let guard = ConnectionGuard::new(ledger.clone());

        let outcome = guard.validate_connection(1, 2, 3).await.unwrap().unwrap();
        assert_eq!(
            outcome.response_message,
            "The logged in user (3) does not match issuing user (1)"
        );
        assert_eq!(ledger.lookup_count(), 0);
    }

    #[tokio::test]
    async fn rejects_duplicates_in_both_orientations() {
        let ledger = Arc::new(FakeLedger::default());
        ledger.seed(2, 1);
        let guard = ConnectionGuard::new(ledger);

        let outcome = guard.validate_connection(1, 2, 1).await.unwrap().unwrap();
        assert_eq!(
            outcome.response_message,
            "This connection already exists in reverse between the requesting user 1 and the to be connected with user 2"
        );
    }

    #[tokio::test]
    async fn existing_connection_check_is_symmetric() {
        let ledger = Arc::new(FakeLedger::default());
        ledger.seed(1, 2);
        let guard = ConnectionGuard::new(ledger);

        assert!(guard.check_existing_connection(1, 2).await.unwrap().is_some());
        assert!(guard.check_existing_connection(2, 1).await.unwrap().is_some());
        assert!(guard.check_existing_connection(1, 3).await.unwrap().is_none());
    }
}
