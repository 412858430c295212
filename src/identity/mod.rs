//! Sign-up, sign-in and session observation.
//!
//! The rest of the crate only ever sees the opaque [`IdentityUser::id`].

use async_trait::async_trait;
use axum::Router;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::{AppError, TransportError};
use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod jwt;
mod memory;
pub mod password;
mod repo;
pub mod session;

pub use jwt::{AuthUser, JwtKeys, MaybeAuthUser};
pub use memory::MemoryIdentityProvider;
pub use password::MIN_PASSWORD_LEN;
pub use repo::PgIdentityProvider;
pub use session::{IdentitySession, Subscription};

/// The signed-in user as the identity backend describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityUser {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Invalid email")]
    InvalidEmail,

    #[error("Password too short")]
    WeakPassword,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for IdentityError {
    fn from(e: sqlx::Error) -> Self {
        IdentityError::Transport(TransportError::Database(e))
    }
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::InvalidEmail | IdentityError::WeakPassword => {
                AppError::Validation(e.to_string())
            }
            IdentityError::EmailTaken => AppError::Conflict(e.to_string()),
            IdentityError::InvalidCredentials => AppError::Unauthorized(e.to_string()),
            IdentityError::UserNotFound => AppError::NotFound(e.to_string()),
            IdentityError::Transport(t) => AppError::Transport(t),
            IdentityError::Internal(i) => AppError::Internal(i),
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn register(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError>;
    async fn login(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError>;
    async fn find(&self, id: &str) -> Result<Option<IdentityUser>, IdentityError>;
    async fn update_display_name(
        &self,
        id: &str,
        display_name: &str,
    ) -> Result<IdentityUser, IdentityError>;
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trim and lower-case an address, rejecting anything that is not shaped like one.
pub(crate) fn normalize_email(email: &str) -> Result<String, IdentityError> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(IdentityError::InvalidEmail);
    }
    Ok(email)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
