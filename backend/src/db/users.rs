use sqlx::PgPool;

use crate::db::connections::LedgerError;
use crate::models::User;

/// User lookup contract, used to resolve display handles for outgoing
/// protocol messages.
#[allow(async_fn_in_trait)]
pub trait UserDirectory {
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, LedgerError>;
}

#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserDirectory for PgUserDirectory {
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, LedgerError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, phone, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

pub async fn create_user(pool: &PgPool, username: &str, phone: &str) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, phone)
        VALUES ($1, $2)
        RETURNING id, username, phone, created_at, updated_at
        "#,
    )
    .bind(username)
    .bind(phone)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_username(pool: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, phone, created_at, updated_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}
