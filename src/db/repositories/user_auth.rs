use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Select, Set,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::lifecycle::{SoftDelete, now_timestamp};
use crate::entities::user_auths::{self, TokenType};
use crate::error::AccountError;

pub struct UserAuthRepository {
    conn: DatabaseConnection,
}

impl UserAuthRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn ordered(select: Select<user_auths::Entity>) -> Select<user_auths::Entity> {
        select.order_by_desc(user_auths::Column::Id)
    }

    /// Record a new token for `user_id` with a fresh UUID.
    ///
    /// `user_id` is stored as given; whether such a user exists is not checked.
    pub async fn create(
        &self,
        user_id: i32,
        token_type: TokenType,
    ) -> Result<user_auths::Model, AccountError> {
        let model = user_auths::ActiveModel {
            user_id: Set(user_id),
            token_type: Set(token_type),
            device_login_count: Set(0),
            uuid: Set(Uuid::new_v4()),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        info!(
            user_id,
            token = %model.uuid,
            "Created {}",
            token_type.label()
        );

        Ok(model)
    }

    pub async fn get_by_uuid(
        &self,
        uuid: Uuid,
    ) -> Result<Option<user_auths::Model>, AccountError> {
        Ok(user_auths::Entity::find()
            .filter(user_auths::Column::Uuid.eq(uuid))
            .one(&self.conn)
            .await?)
    }

    pub async fn get_active_by_uuid(
        &self,
        uuid: Uuid,
    ) -> Result<Option<user_auths::Model>, AccountError> {
        Ok(user_auths::Entity::find_active()
            .filter(user_auths::Column::Uuid.eq(uuid))
            .one(&self.conn)
            .await?)
    }

    pub async fn list_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<user_auths::Model>, AccountError> {
        Ok(Self::ordered(user_auths::Entity::find())
            .filter(user_auths::Column::UserId.eq(user_id))
            .all(&self.conn)
            .await?)
    }

    pub async fn list_active_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<user_auths::Model>, AccountError> {
        Ok(Self::ordered(user_auths::Entity::find_active())
            .filter(user_auths::Column::UserId.eq(user_id))
            .all(&self.conn)
            .await?)
    }

    /// Bump the device login counter of a live token, returning the new value.
    pub async fn increment_device_login_count(&self, uuid: Uuid) -> Result<i32, AccountError> {
        let result = user_auths::Entity::update_many()
            .col_expr(
                user_auths::Column::DeviceLoginCount,
                Expr::col(user_auths::Column::DeviceLoginCount).add(1),
            )
            .col_expr(user_auths::Column::UpdateTime, Expr::value(now_timestamp()))
            .filter(user_auths::Column::Uuid.eq(uuid))
            .filter(user_auths::Column::IsDeleted.eq(false))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AccountError::not_found("Token", uuid));
        }

        let token = self
            .get_by_uuid(uuid)
            .await?
            .ok_or_else(|| AccountError::not_found("Token", uuid))?;

        debug!(token = %uuid, count = token.device_login_count, "Device login recorded");
        Ok(token.device_login_count)
    }

    /// Soft-delete a token. Revoking an already revoked token is a no-op.
    pub async fn revoke(&self, uuid: Uuid) -> Result<user_auths::Model, AccountError> {
        let token = self
            .get_by_uuid(uuid)
            .await?
            .ok_or_else(|| AccountError::not_found("Token", uuid))?;

        if token.is_deleted {
            return Ok(token);
        }

        let mut active: user_auths::ActiveModel = token.into();
        active.is_deleted = Set(true);

        let model = active.update(&self.conn).await?;
        info!(user_id = model.user_id, token = %uuid, "Revoked token");

        Ok(model)
    }

    /// Soft-delete every live token of a user. Returns how many were revoked.
    pub async fn revoke_all_for_user(&self, user_id: i32) -> Result<u64, AccountError> {
        let result = user_auths::Entity::update_many()
            .col_expr(user_auths::Column::IsDeleted, Expr::value(true))
            .col_expr(user_auths::Column::UpdateTime, Expr::value(now_timestamp()))
            .filter(user_auths::Column::UserId.eq(user_id))
            .filter(user_auths::Column::IsDeleted.eq(false))
            .exec(&self.conn)
            .await?;

        if result.rows_affected > 0 {
            info!(user_id, count = result.rows_affected, "Revoked all tokens");
        }

        Ok(result.rows_affected)
    }
}
