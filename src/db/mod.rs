use crate::config::{Config, SecurityConfig};
use crate::entities::user_auths::{self, TokenType};
use crate::error::AccountError;
use crate::models::user::{NewUser, RoleFlags, UserUpdate};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    security: SecurityConfig,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = Self::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(store.with_security(config.security.clone()))
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
        let path_str = path_str.split('?').next().unwrap_or(path_str);

        if !is_in_memory(db_url) {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self {
            conn,
            security: SecurityConfig::default(),
        })
    }

    #[must_use]
    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    // ========== User Repository Methods ==========

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone(), self.security.clone())
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User, AccountError> {
        self.user_repo().create_user(new_user).await
    }

    pub async fn create_staff_user(&self, new_user: NewUser) -> Result<User, AccountError> {
        self.user_repo().create_staff_user(new_user).await
    }

    pub async fn create_superuser(&self, new_user: NewUser) -> Result<User, AccountError> {
        self.user_repo().create_superuser(new_user).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>, AccountError> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<Option<User>, AccountError> {
        self.user_repo().get_by_phone_number(phone_number).await
    }

    pub async fn get_active_user_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<Option<User>, AccountError> {
        self.user_repo()
            .get_active_by_phone_number(phone_number)
            .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AccountError> {
        self.user_repo().list_all().await
    }

    pub async fn list_active_users(&self) -> Result<Vec<User>, AccountError> {
        self.user_repo().list_active().await
    }

    pub async fn update_user_profile(
        &self,
        id: i32,
        update: UserUpdate,
    ) -> Result<User, AccountError> {
        self.user_repo().update_profile(id, update).await
    }

    pub async fn set_user_flags(&self, id: i32, flags: RoleFlags) -> Result<User, AccountError> {
        self.user_repo().set_flags(id, flags).await
    }

    pub async fn soft_delete_user(&self, id: i32) -> Result<User, AccountError> {
        self.user_repo().soft_delete(id).await
    }

    pub async fn deactivate_user(&self, id: i32) -> Result<(User, u64), AccountError> {
        self.user_repo().deactivate(id).await
    }

    pub async fn restore_user(&self, id: i32) -> Result<User, AccountError> {
        self.user_repo().restore(id).await
    }

    pub async fn set_user_password(&self, id: i32, password: &str) -> Result<(), AccountError> {
        self.user_repo().set_password(id, password).await
    }

    pub async fn check_user_password(
        &self,
        phone_number: &str,
        password: &str,
    ) -> Result<bool, AccountError> {
        self.user_repo()
            .check_password(phone_number, password)
            .await
    }

    pub async fn record_user_login(&self, id: i32) -> Result<User, AccountError> {
        self.user_repo().record_login(id).await
    }

    // ========== UserAuth Repository Methods ==========

    #[must_use]
    pub fn user_auth_repo(&self) -> repositories::user_auth::UserAuthRepository {
        repositories::user_auth::UserAuthRepository::new(self.conn.clone())
    }

    pub async fn create_token(
        &self,
        user_id: i32,
        token_type: TokenType,
    ) -> Result<user_auths::Model, AccountError> {
        self.user_auth_repo().create(user_id, token_type).await
    }

    pub async fn get_token(
        &self,
        uuid: Uuid,
    ) -> Result<Option<user_auths::Model>, AccountError> {
        self.user_auth_repo().get_by_uuid(uuid).await
    }

    pub async fn get_active_token(
        &self,
        uuid: Uuid,
    ) -> Result<Option<user_auths::Model>, AccountError> {
        self.user_auth_repo().get_active_by_uuid(uuid).await
    }

    pub async fn list_tokens_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<user_auths::Model>, AccountError> {
        self.user_auth_repo().list_for_user(user_id).await
    }

    pub async fn list_active_tokens_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<user_auths::Model>, AccountError> {
        self.user_auth_repo().list_active_for_user(user_id).await
    }

    pub async fn increment_device_login_count(&self, uuid: Uuid) -> Result<i32, AccountError> {
        self.user_auth_repo()
            .increment_device_login_count(uuid)
            .await
    }

    pub async fn revoke_token(&self, uuid: Uuid) -> Result<user_auths::Model, AccountError> {
        self.user_auth_repo().revoke(uuid).await
    }

    pub async fn revoke_all_tokens_for_user(&self, user_id: i32) -> Result<u64, AccountError> {
        self.user_auth_repo().revoke_all_for_user(user_id).await
    }
}

fn is_in_memory(db_url: &str) -> bool {
    db_url.contains(":memory:") || db_url.contains("mode=memory")
}
