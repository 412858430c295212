use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use super::model::{ProfilePatch, UserProfile};
use crate::errors::{AppError, ValidationError};
use crate::identity::IdentityUser;
use crate::store::{DocumentStore, StoreError};

pub const USERS_COLLECTION: &str = "users";

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("encode profile: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::Validation(v) => v.into(),
            ProfileError::Store(StoreError::Transport(t)) => AppError::Transport(t),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

/// Nutrition-goal profiles kept in the `users` collection, one document per user id.
#[derive(Clone)]
pub struct ProfileStore {
    docs: Arc<dyn DocumentStore>,
}

impl ProfileStore {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self { docs }
    }

    /// Writes `defaults ← identity fields ← patch` for a fresh user, or applies
    /// the patch when a profile already exists. Returns the stored record.
    pub async fn create(
        &self,
        user: &IdentityUser,
        patch: &ProfilePatch,
    ) -> Result<UserProfile, ProfileError> {
        patch.validate()?;

        if self.docs.exists(USERS_COLLECTION, &user.id).await? {
            let merged = ProfilePatch {
                display_name: patch.display_name.clone().or_else(|| user.display_name.clone()),
                email: patch.email.clone().or_else(|| user.email.clone()),
                ..patch.clone()
            };
            self.update(&user.id, &merged).await?;
            if let Some(existing) = self.get(&user.id).await? {
                return Ok(existing);
            }
        }

        let mut profile = UserProfile::for_user(user);
        profile.apply(patch);
        self.docs
            .set(USERS_COLLECTION, &user.id, serde_json::to_value(&profile)?)
            .await?;
        info!(user_id = %user.id, "profile created");
        Ok(profile)
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, ProfileError> {
        let doc = self.docs.get(USERS_COLLECTION, user_id).await?;
        Ok(doc.map(|d| UserProfile::from_document(user_id, &d)))
    }

    /// Applies the recognised fields of `patch`, creating the profile from
    /// defaults when none exists yet.
    pub async fn update(&self, user_id: &str, patch: &ProfilePatch) -> Result<bool, ProfileError> {
        patch.validate()?;

        if self.docs.exists(USERS_COLLECTION, user_id).await? {
            if patch.is_empty() {
                return Ok(true);
            }
            match self
                .docs
                .update(USERS_COLLECTION, user_id, patch.to_document())
                .await
            {
                Ok(()) => {
                    debug!(user_id = %user_id, "profile updated");
                    return Ok(true);
                }
                // deleted between the existence check and the write
                Err(StoreError::NotFound { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }

        let mut profile = UserProfile::new(user_id);
        profile.apply(patch);
        self.docs
            .set(USERS_COLLECTION, user_id, serde_json::to_value(&profile)?)
            .await?;
        info!(user_id = %user_id, "profile created on update");
        Ok(true)
    }
}
