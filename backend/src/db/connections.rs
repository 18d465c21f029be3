use sqlx::PgPool;
use thiserror::Error;

use crate::models::Connection;

/// Typed persistence outcome for connection writes. Callers can tell a lost
/// insert race apart from an unreachable database without catching a broad
/// fault.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("a connection between these users already exists")]
    Duplicate,
    #[error("a user may not be connected with themselves")]
    SelfConnection,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence contract for connection rows. Narrow on purpose so tests can
/// stand in a double without a live database.
#[allow(async_fn_in_trait)]
pub trait ConnectionLedger {
    async fn insert(
        &self,
        requesting_user_id: i64,
        to_be_connected_with_user_id: i64,
    ) -> Result<Connection, LedgerError>;

    /// Looks up a connection matching either orientation of the pair.
    async fn find_by_either_ordering(
        &self,
        user_id_a: i64,
        user_id_b: i64,
    ) -> Result<Option<Connection>, LedgerError>;

    async fn find_all_by_target(&self, user_id: i64) -> Result<Vec<Connection>, LedgerError>;

    /// Deletes by the exact ordered pair as stored; the reverse orientation
    /// is not searched. Returns the number of rows removed so callers can
    /// tell a no-op apart from a real deletion.
    async fn delete_by_ordered_pair(
        &self,
        requesting_user_id: i64,
        connected_with_user_id: i64,
    ) -> Result<u64, LedgerError>;
}

#[derive(Debug, Clone)]
pub struct PgConnectionLedger {
    pool: PgPool,
}

impl PgConnectionLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ConnectionLedger for PgConnectionLedger {
    async fn insert(
        &self,
        requesting_user_id: i64,
        to_be_connected_with_user_id: i64,
    ) -> Result<Connection, LedgerError> {
        let connection = sqlx::query_as::<_, Connection>(
            r#"
            INSERT INTO connections (requesting_user_id, to_be_connected_with_user_id)
            VALUES ($1, $2)
            RETURNING id, requesting_user_id, to_be_connected_with_user_id, created_at
            "#,
        )
        .bind(requesting_user_id)
        .bind(to_be_connected_with_user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            // The unordered-pair unique index catches duplicates in either
            // orientation, including the losing side of a confirmation race.
            Some(db) if db.is_unique_violation() => LedgerError::Duplicate,
            Some(db) if db.is_check_violation() => LedgerError::SelfConnection,
            _ => LedgerError::Database(e),
        })?;

        Ok(connection)
    }

    async fn find_by_either_ordering(
        &self,
        user_id_a: i64,
        user_id_b: i64,
    ) -> Result<Option<Connection>, LedgerError> {
        let connection = sqlx::query_as::<_, Connection>(
            r#"
            SELECT id, requesting_user_id, to_be_connected_with_user_id, created_at
            FROM connections
            WHERE (requesting_user_id = $1 AND to_be_connected_with_user_id = $2)
               OR (requesting_user_id = $2 AND to_be_connected_with_user_id = $1)
            "#,
        )
        .bind(user_id_a)
        .bind(user_id_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(connection)
    }

    async fn find_all_by_target(&self, user_id: i64) -> Result<Vec<Connection>, LedgerError> {
        let connections = sqlx::query_as::<_, Connection>(
            r#"
            SELECT id, requesting_user_id, to_be_connected_with_user_id, created_at
            FROM connections
            WHERE to_be_connected_with_user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(connections)
    }

    async fn delete_by_ordered_pair(
        &self,
        requesting_user_id: i64,
        connected_with_user_id: i64,
    ) -> Result<u64, LedgerError> {
        let result = sqlx::query(
            r#"
            DELETE FROM connections
            WHERE requesting_user_id = $1 AND to_be_connected_with_user_id = $2
            "#,
        )
        .bind(requesting_user_id)
        .bind(connected_with_user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
