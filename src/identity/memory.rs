use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    normalize_email,
    password::{hash_new_password, verify_password},
    IdentityError, IdentityProvider, IdentityUser,
};

struct Account {
    user: IdentityUser,
    email: String,
    password_hash: String,
}

/// Identities held in process memory. Used by `STORAGE_BACKEND=memory` and tests.
#[derive(Default)]
pub struct MemoryIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn register(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError> {
        let email = normalize_email(email)?;
        let password_hash = hash_new_password(password)?;

        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == email) {
            return Err(IdentityError::EmailTaken);
        }

        let user = IdentityUser {
            id: Uuid::new_v4().to_string(),
            email: Some(email.clone()),
            display_name: None,
        };
        accounts.insert(
            user.id.clone(),
            Account {
                user: user.clone(),
                email,
                password_hash,
            },
        );
        Ok(user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError> {
        let email = normalize_email(email)?;
        let (user, password_hash) = {
            let accounts = self.accounts.read().await;
            let account = accounts
                .values()
                .find(|a| a.email == email)
                .ok_or(IdentityError::InvalidCredentials)?;
            (account.user.clone(), account.password_hash.clone())
        };
        if !verify_password(password, &password_hash)? {
            return Err(IdentityError::InvalidCredentials);
        }
        Ok(user)
    }

    async fn find(&self, id: &str) -> Result<Option<IdentityUser>, IdentityError> {
        Ok(self.accounts.read().await.get(id).map(|a| a.user.clone()))
    }

    async fn update_display_name(
        &self,
        id: &str,
        display_name: &str,
    ) -> Result<IdentityUser, IdentityError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(id).ok_or(IdentityError::UserNotFound)?;
        account.user.display_name = Some(display_name.to_string());
        Ok(account.user.clone())
    }
}
