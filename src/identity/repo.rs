use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use super::{
    normalize_email,
    password::{hash_new_password, verify_password},
    IdentityError, IdentityProvider, IdentityUser,
};

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String, // argon2, never leaves this module
    display_name: Option<String>,
    #[allow(dead_code)]
    created_at: OffsetDateTime,
}

impl From<UserRow> for IdentityUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id.to_string(),
            email: Some(row.email),
            display_name: row.display_name,
        }
    }
}

/// Identities kept in the `users` table with argon2 password hashes.
#[derive(Clone)]
pub struct PgIdentityProvider {
    db: PgPool,
}

impl PgIdentityProvider {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, IdentityError> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, display_name, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn register(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError> {
        let email = normalize_email(email)?;
        let hash = hash_new_password(password)?;

        if self.find_by_email(&email).await?.is_some() {
            return Err(IdentityError::EmailTaken);
        }

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, display_name, created_at
            "#,
        )
        .bind(&email)
        .bind(&hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                IdentityError::EmailTaken
            } else {
                e.into()
            }
        })?;

        Ok(row.into())
    }

    async fn login(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError> {
        let email = normalize_email(email)?;
        let Some(row) = self.find_by_email(&email).await? else {
            warn!(email = %email, "login unknown email");
            return Err(IdentityError::InvalidCredentials);
        };

        if !verify_password(password, &row.password_hash)? {
            warn!(email = %email, user_id = %row.id, "login invalid password");
            return Err(IdentityError::InvalidCredentials);
        }

        Ok(row.into())
    }

    async fn find(&self, id: &str) -> Result<Option<IdentityUser>, IdentityError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, email, password_hash, display_name, created_at FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn update_display_name(
        &self,
        id: &str,
        display_name: &str,
    ) -> Result<IdentityUser, IdentityError> {
        let id = Uuid::parse_str(id).map_err(|_| IdentityError::UserNotFound)?;
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET display_name = $2
            WHERE id = $1
            RETURNING id, email, password_hash, display_name, created_at
            "#,
        )
        .bind(id)
        .bind(display_name)
        .fetch_optional(&self.db)
        .await?
        .ok_or(IdentityError::UserNotFound)?;
        Ok(row.into())
    }
}
