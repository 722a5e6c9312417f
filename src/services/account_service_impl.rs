//! `SeaORM` implementation of the `AccountService` trait.

use crate::db::{Store, User};
use crate::entities::user_auths::TokenType;
use crate::error::AccountError;
use crate::models::user::{NewUser, UserUpdate};
use crate::services::account_service::{AccountService, TokenInfo, UserInfo};
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

pub struct SeaOrmAccountService {
    store: Store,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn active_user(&self, phone_number: &str) -> Result<User, AccountError> {
        self.store
            .get_active_user_by_phone_number(phone_number)
            .await?
            .ok_or_else(|| AccountError::not_found("User", phone_number))
    }

    async fn any_user(&self, phone_number: &str) -> Result<User, AccountError> {
        self.store
            .get_user_by_phone_number(phone_number)
            .await?
            .ok_or_else(|| AccountError::not_found("User", phone_number))
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn register(&self, new_user: NewUser) -> Result<UserInfo, AccountError> {
        let user = self.store.create_user(new_user).await?;
        Ok(user.into())
    }

    async fn register_superuser(&self, new_user: NewUser) -> Result<UserInfo, AccountError> {
        let user = self.store.create_superuser(new_user).await?;
        Ok(user.into())
    }

    async fn get_user(&self, phone_number: &str) -> Result<UserInfo, AccountError> {
        Ok(self.active_user(phone_number).await?.into())
    }

    async fn list_users(&self, include_deleted: bool) -> Result<Vec<UserInfo>, AccountError> {
        let users = if include_deleted {
            self.store.list_users().await?
        } else {
            self.store.list_active_users().await?
        };

        Ok(users.into_iter().map(UserInfo::from).collect())
    }

    async fn update_profile(
        &self,
        phone_number: &str,
        update: UserUpdate,
    ) -> Result<UserInfo, AccountError> {
        let user = self.active_user(phone_number).await?;
        let user = self.store.update_user_profile(user.id, update).await?;
        Ok(user.into())
    }

    async fn deactivate(&self, phone_number: &str) -> Result<UserInfo, AccountError> {
        let user = self.any_user(phone_number).await?;
        let (user, revoked) = self.store.deactivate_user(user.id).await?;
        debug!(user_id = user.id, revoked, "Deactivated {}", user);

        Ok(user.into())
    }

    async fn reactivate(&self, phone_number: &str) -> Result<UserInfo, AccountError> {
        let user = self.any_user(phone_number).await?;
        let user = self.store.restore_user(user.id).await?;
        Ok(user.into())
    }

    async fn change_password(
        &self,
        phone_number: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let user = self.active_user(phone_number).await?;
        self.store.set_user_password(user.id, new_password).await
    }

    async fn issue_token(
        &self,
        phone_number: &str,
        token_type: TokenType,
    ) -> Result<TokenInfo, AccountError> {
        let user = self.active_user(phone_number).await?;
        let token = self.store.create_token(user.id, token_type).await?;
        Ok(token.into())
    }

    async fn list_tokens(
        &self,
        phone_number: &str,
        include_revoked: bool,
    ) -> Result<Vec<TokenInfo>, AccountError> {
        let user = self.any_user(phone_number).await?;

        let tokens = if include_revoked {
            self.store.list_tokens_for_user(user.id).await?
        } else {
            self.store.list_active_tokens_for_user(user.id).await?
        };

        Ok(tokens.into_iter().map(TokenInfo::from).collect())
    }

    async fn record_device_login(&self, uuid: Uuid) -> Result<i32, AccountError> {
        self.store.increment_device_login_count(uuid).await
    }

    async fn revoke_token(&self, uuid: Uuid) -> Result<TokenInfo, AccountError> {
        Ok(self.store.revoke_token(uuid).await?.into())
    }
}
