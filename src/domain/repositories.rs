//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;

/// Input for registering an account
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Server-assigned identity of a freshly created account
#[derive(Debug, Clone, Serialize)]
pub struct CreatedUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub created_at: String,
}

/// Full identity row, including the stored credential.
///
/// Never serialized: it carries the password.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    /// Empty when the column is NULL
    pub bio: String,
    pub countries_visited: i32,
}

/// Read-only profile projection (no credential)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub bio: String,
    pub countries_visited: i32,
    pub created_at: String,
    pub updated_at: String,
}

/// Profile as re-read after a partial update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatedProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub bio: String,
    pub countries_visited: i32,
    pub updated_at: String,
}

/// Requested profile changes.
///
/// A field takes part in the update only when it is present and meaningful:
/// a non-empty string, or a positive counter. Everything else is left untouched.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub full_name: Option<String>,
    pub countries_visited: Option<i32>,
}

/// Row of the user listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub countries_visited: i32,
}

/// Paginated users with the total count of live users
#[derive(Debug, Serialize)]
pub struct UserPage {
    pub users: Vec<UserSummary>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// Aggregated statistics over a user's stories
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityAggregate {
    pub user_id: String,
    pub stories_count: i64,
    pub comments_count: i64,
    pub likes_received: i64,
    pub countries_visited: i32,
    pub last_activity: Option<String>,
}

/// A stored follow relationship
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowEdge {
    pub follower_id: String,
    pub following_id: String,
    pub followed_at: String,
}

/// Row of a followers listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowerSummary {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub followed_at: String,
}

/// Paginated followers with the total follower count
#[derive(Debug, Serialize)]
pub struct FollowerPage {
    pub followers: Vec<FollowerSummary>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// Repository trait for the User aggregate and its follow graph.
///
/// Every method only sees live users (`deleted_at = 0`), except that
/// `delete_user` is the operation that sets the marker.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account; `Conflict` when username or email is taken
    async fn create_user(&self, user: NewUser) -> Result<CreatedUser, DomainError>;

    /// Fetch a live user by ID
    async fn get_user_by_id(&self, id: &str) -> Result<UserRecord, DomainError>;

    /// Fetch a live user by email (login lookup)
    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, DomainError>;

    /// Fetch the credential-free profile projection
    async fn get_user_profile(&self, id: &str) -> Result<ProfileRecord, DomainError>;

    /// Write only the provided fields, bump `updated_at` and re-read the row
    async fn update_user(
        &self,
        id: &str,
        update: ProfileUpdate,
    ) -> Result<UpdatedProfile, DomainError>;

    /// List live users. A zero limit is unbounded, a zero offset skips nothing.
    async fn get_users(&self, limit: u64, offset: u64) -> Result<UserPage, DomainError>;

    /// Soft-delete a live user; `NotFound` if already deleted or unknown
    async fn delete_user(&self, id: &str) -> Result<(), DomainError>;

    /// Overwrite the stored credential. The caller verifies the old one.
    async fn update_password(&self, id: &str, new_password: &str) -> Result<(), DomainError>;

    /// Aggregate story statistics for a live user
    async fn get_user_activity(&self, user_id: &str) -> Result<ActivityAggregate, DomainError>;

    /// Record that `follower_id` follows `following_id`. Both must be live;
    /// `followed_at` is stamped by the store.
    async fn follow(&self, follower_id: &str, following_id: &str)
    -> Result<FollowEdge, DomainError>;

    /// List live users following `user_id`, ordered by username.
    ///
    /// Direction: the rows are edges whose `following_id` is `user_id`, i.e. who
    /// follows this account. The accounts `user_id` itself follows are not listed
    /// here, even though the parameter once carried the follower's id.
    async fn get_followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> Result<FollowerPage, DomainError>;
}
