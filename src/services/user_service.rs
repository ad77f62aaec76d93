//! User Service - orchestration over the user repository
//!
//! Each call delegates to exactly one repository operation, except the
//! credential flows which fetch, compare and only then act. The service keeps
//! no state of its own between calls.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::{
    ActivityAggregate, CreatedUser, DomainError, FollowEdge, FollowerPage, NewUser,
    ProfileRecord, ProfileUpdate, UpdatedProfile, UserPage, UserRecord, UserRepository,
};

/// Credentials presented at login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Password change for the authenticated caller
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn register(&self, req: NewUser) -> Result<CreatedUser, DomainError> {
        for (field, value) in [
            ("username", &req.username),
            ("email", &req.email),
            ("password", &req.password),
        ] {
            if value.is_empty() {
                return Err(DomainError::InvalidArgument(format!("{} is required", field)));
            }
        }

        let created = self.repo.create_user(req).await?;
        tracing::info!(user_id = %created.id, "user registered");
        Ok(created)
    }

    /// Resolve an account from its credentials.
    ///
    /// An unknown email and a wrong password are indistinguishable to the caller.
    pub async fn login(&self, req: LoginRequest) -> Result<UserRecord, DomainError> {
        let user = match self.repo.get_user_by_email(&req.email).await {
            Ok(user) => user,
            Err(DomainError::NotFound) => {
                tracing::debug!("login rejected: no live account for email");
                return Err(DomainError::Unauthenticated);
            }
            Err(e) => return Err(e),
        };

        if user.password.as_bytes() != req.password.as_bytes() {
            tracing::debug!(user_id = %user.id, "login rejected: password mismatch");
            return Err(DomainError::Unauthenticated);
        }

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(user)
    }

    /// Change the caller's password after checking the current one.
    ///
    /// Verify and write are two round trips; a concurrent delete in between
    /// makes the write report `NotFound`.
    pub async fn reset_password(
        &self,
        caller_id: &str,
        req: ResetPasswordRequest,
    ) -> Result<(), DomainError> {
        let user = match self.repo.get_user_by_id(caller_id).await {
            Ok(user) => user,
            Err(DomainError::NotFound) => return Err(DomainError::Unauthenticated),
            Err(e) => return Err(e),
        };

        if user.password.as_bytes() != req.old_password.as_bytes() {
            tracing::debug!(user_id = %caller_id, "password reset rejected: old password mismatch");
            return Err(DomainError::Unauthenticated);
        }

        self.repo
            .update_password(caller_id, &req.new_password)
            .await?;

        tracing::info!(user_id = %caller_id, "password changed");
        Ok(())
    }

    /// The caller's own profile
    pub async fn profile(&self, caller_id: &str) -> Result<ProfileRecord, DomainError> {
        self.repo.get_user_profile(caller_id).await
    }

    pub async fn update_profile(
        &self,
        caller_id: &str,
        update: ProfileUpdate,
    ) -> Result<UpdatedProfile, DomainError> {
        self.repo.update_user(caller_id, update).await
    }

    pub async fn list_users(&self, limit: u64, offset: u64) -> Result<UserPage, DomainError> {
        self.repo.get_users(limit, offset).await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), DomainError> {
        self.repo.delete_user(user_id).await?;
        tracing::info!(user_id = %user_id, "user soft-deleted");
        Ok(())
    }

    pub async fn activity(&self, user_id: &str) -> Result<ActivityAggregate, DomainError> {
        self.repo.get_user_activity(user_id).await
    }

    /// The caller starts following `following_id`. Following oneself is allowed.
    pub async fn follow(
        &self,
        caller_id: &str,
        following_id: &str,
    ) -> Result<FollowEdge, DomainError> {
        self.repo.follow(caller_id, following_id).await
    }

    pub async fn followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> Result<FollowerPage, DomainError> {
        self.repo.get_followers(user_id, limit, offset).await
    }
}
