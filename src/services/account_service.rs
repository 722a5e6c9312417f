//! Domain service for user accounts and their token records.
//!
//! Callers address users by phone number, the login identifier. Lookups
//! through this service only see non-deleted users unless a method says
//! otherwise.

use serde::Serialize;
use uuid::Uuid;

use crate::db::User;
use crate::entities::user_auths::{self, TokenType};
use crate::error::AccountError;
use crate::models::user::{NewUser, UserUpdate};

/// User info DTO for responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub is_admin: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_deleted: bool,
    pub last_login: Option<String>,
    pub create_time: String,
    pub update_time: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            phone_number: user.phone_number,
            is_admin: user.is_admin,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            is_deleted: user.is_deleted,
            last_login: user.last_login,
            create_time: user.create_time,
            update_time: user.update_time,
        }
    }
}

/// Token record DTO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub uuid: Uuid,
    pub user_id: i32,
    pub token_type: TokenType,
    pub device_login_count: i32,
    pub revoked: bool,
    pub create_time: String,
}

impl From<user_auths::Model> for TokenInfo {
    fn from(model: user_auths::Model) -> Self {
        Self {
            uuid: model.uuid,
            user_id: model.user_id,
            token_type: model.token_type,
            device_login_count: model.device_login_count,
            revoked: model.is_deleted,
            create_time: model.create_time,
        }
    }
}

/// Domain service trait for account management.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Creates a regular user.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] for malformed fields and
    /// [`AccountError::Conflict`] when a unique field is already taken.
    async fn register(&self, new_user: NewUser) -> Result<UserInfo, AccountError>;

    /// Creates a user with every role flag set.
    async fn register_superuser(&self, new_user: NewUser) -> Result<UserInfo, AccountError>;

    /// Gets a non-deleted user.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::NotFound`] if no live user has that phone number.
    async fn get_user(&self, phone_number: &str) -> Result<UserInfo, AccountError>;

    /// Lists users, newest changes first.
    async fn list_users(&self, include_deleted: bool) -> Result<Vec<UserInfo>, AccountError>;

    async fn update_profile(
        &self,
        phone_number: &str,
        update: UserUpdate,
    ) -> Result<UserInfo, AccountError>;

    /// Soft-deletes a user and revokes its live tokens.
    async fn deactivate(&self, phone_number: &str) -> Result<UserInfo, AccountError>;

    /// Clears the deleted flag. Tokens revoked on deactivation stay revoked.
    async fn reactivate(&self, phone_number: &str) -> Result<UserInfo, AccountError>;

    async fn change_password(
        &self,
        phone_number: &str,
        new_password: &str,
    ) -> Result<(), AccountError>;

    /// Records a token for a live user.
    async fn issue_token(
        &self,
        phone_number: &str,
        token_type: TokenType,
    ) -> Result<TokenInfo, AccountError>;

    async fn list_tokens(
        &self,
        phone_number: &str,
        include_revoked: bool,
    ) -> Result<Vec<TokenInfo>, AccountError>;

    /// Counts one more device login on a live token.
    async fn record_device_login(&self, uuid: Uuid) -> Result<i32, AccountError>;

    async fn revoke_token(&self, uuid: Uuid) -> Result<TokenInfo, AccountError>;
}
