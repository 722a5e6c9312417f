use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Select, Set, TransactionTrait,
};
use serde::Serialize;
use std::fmt;
use tokio::task;
use tracing::{debug, info};

use crate::config::SecurityConfig;
use crate::entities::lifecycle::{Lifecycle, SoftDelete, now_timestamp};
use crate::entities::{user_auths, users};
use crate::error::AccountError;
use crate::models::user::{NewUser, RoleFlags, UserUpdate};
use crate::validators::{self, ValidationError};

/// Prefix marking a password hash that can never verify.
const UNUSABLE_PASSWORD_PREFIX: char = '!';

/// User data returned from repository (without password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub is_admin: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub has_usable_password: bool,
    pub last_login: Option<String>,
    pub create_time: String,
    pub update_time: String,
    pub is_deleted: bool,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            has_usable_password: !model.password_hash.starts_with(UNUSABLE_PASSWORD_PREFIX),
            username: model.username,
            email: model.email,
            phone_number: model.phone_number,
            is_admin: model.is_admin,
            is_staff: model.is_staff,
            is_superuser: model.is_superuser,
            last_login: model.last_login,
            create_time: model.create_time,
            update_time: model.update_time,
            is_deleted: model.is_deleted,
        }
    }
}

impl User {
    #[must_use]
    pub const fn flags(&self) -> RoleFlags {
        RoleFlags {
            is_admin: self.is_admin,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.username, self.phone_number)
    }
}

impl Lifecycle for User {
    fn create_time(&self) -> &str {
        &self.create_time
    }

    fn update_time(&self) -> &str {
        &self.update_time
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
    security: SecurityConfig,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, security: SecurityConfig) -> Self {
        Self { conn, security }
    }

    /// Newest changes first, deleted rows after live ones on ties.
    fn ordered(select: Select<users::Entity>) -> Select<users::Entity> {
        select
            .order_by_desc(users::Column::UpdateTime)
            .order_by_desc(users::Column::CreateTime)
            .order_by_asc(users::Column::IsDeleted)
    }

    async fn find_model(&self, id: i32) -> Result<users::Model, AccountError> {
        users::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| AccountError::not_found("User", id))
    }

    /// Create a regular user with the role flags carried by `new_user`.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, AccountError> {
        let flags = new_user.flags;
        self.insert(new_user, flags).await
    }

    /// Create a user with `is_staff` forced on.
    pub async fn create_staff_user(&self, new_user: NewUser) -> Result<User, AccountError> {
        let flags = RoleFlags {
            is_staff: true,
            ..new_user.flags
        };
        self.insert(new_user, flags).await
    }

    /// Create a user with every role flag forced on.
    pub async fn create_superuser(&self, new_user: NewUser) -> Result<User, AccountError> {
        self.insert(new_user, RoleFlags::superuser()).await
    }

    async fn insert(&self, new_user: NewUser, flags: RoleFlags) -> Result<User, AccountError> {
        let NewUser {
            username,
            email,
            phone_number,
            password,
            ..
        } = new_user;

        let email = validators::normalize_email(&email);

        validators::validate_username(&username)?;
        validators::validate_email(&email)?;
        validators::validate_phone_number(&phone_number)?;

        let password_hash = match password {
            Some(password) => self.hash(password).await?,
            None => unusable_password(),
        };

        let model = users::ActiveModel {
            username: Set(username),
            email: Set(email),
            phone_number: Set(phone_number),
            password_hash: Set(password_hash),
            is_admin: Set(flags.is_admin),
            is_staff: Set(flags.is_staff),
            is_superuser: Set(flags.is_superuser),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        info!(
            user_id = model.id,
            staff = model.is_staff,
            superuser = model.is_superuser,
            "Created user {}",
            model.username
        );

        Ok(User::from(model))
    }

    /// Get user by ID, deleted or not
    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>, AccountError> {
        let user = users::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(user.map(User::from))
    }

    /// Get user by phone number, deleted or not
    pub async fn get_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<Option<User>, AccountError> {
        let user = users::Entity::find()
            .filter(users::Column::PhoneNumber.eq(phone_number))
            .one(&self.conn)
            .await?;

        Ok(user.map(User::from))
    }

    /// Get a non-deleted user by phone number
    pub async fn get_active_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<Option<User>, AccountError> {
        let user = users::Entity::find_active()
            .filter(users::Column::PhoneNumber.eq(phone_number))
            .one(&self.conn)
            .await?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, AccountError> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, AccountError> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(validators::normalize_email(email)))
            .one(&self.conn)
            .await?;

        Ok(user.map(User::from))
    }

    pub async fn list_all(&self) -> Result<Vec<User>, AccountError> {
        let rows = Self::ordered(users::Entity::find()).all(&self.conn).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn list_active(&self) -> Result<Vec<User>, AccountError> {
        let rows = Self::ordered(users::Entity::find_active())
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Change username and/or email. Validation runs before the write.
    pub async fn update_profile(&self, id: i32, update: UserUpdate) -> Result<User, AccountError> {
        if update.is_empty() {
            return self.find_model(id).await.map(User::from);
        }

        let username = update.username;
        let email = update.email.map(|e| validators::normalize_email(&e));

        if let Some(username) = &username {
            validators::validate_username(username)?;
        }
        if let Some(email) = &email {
            validators::validate_email(email)?;
        }

        let user = self.find_model(id).await?;
        let mut active: users::ActiveModel = user.into();

        if let Some(username) = username {
            active.username = Set(username);
        }
        if let Some(email) = email {
            active.email = Set(email);
        }

        let model = active.update(&self.conn).await?;
        debug!(user_id = id, "Updated user profile");

        Ok(User::from(model))
    }

    pub async fn set_flags(&self, id: i32, flags: RoleFlags) -> Result<User, AccountError> {
        let user = self.find_model(id).await?;

        let mut active: users::ActiveModel = user.into();
        active.is_admin = Set(flags.is_admin);
        active.is_staff = Set(flags.is_staff);
        active.is_superuser = Set(flags.is_superuser);

        let model = active.update(&self.conn).await?;
        info!(user_id = id, ?flags, "Updated user role flags");

        Ok(User::from(model))
    }

    /// Mark the user deleted. The row stays in the table.
    pub async fn soft_delete(&self, id: i32) -> Result<User, AccountError> {
        self.set_deleted(id, true).await
    }

    pub async fn restore(&self, id: i32) -> Result<User, AccountError> {
        self.set_deleted(id, false).await
    }

    async fn set_deleted(&self, id: i32, deleted: bool) -> Result<User, AccountError> {
        let user = self.find_model(id).await?;
        if user.is_deleted == deleted {
            return Ok(User::from(user));
        }

        let mut active: users::ActiveModel = user.into();
        active.is_deleted = Set(deleted);

        let model = active.update(&self.conn).await?;
        info!(user_id = id, deleted, "Changed user status");

        Ok(User::from(model))
    }

    /// Soft-delete the user and revoke its live tokens in one transaction.
    /// Returns the user and how many tokens were revoked.
    pub async fn deactivate(&self, id: i32) -> Result<(User, u64), AccountError> {
        let txn = self.conn.begin().await?;

        let user = users::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AccountError::not_found("User", id))?;

        let user = if user.is_deleted {
            user
        } else {
            let mut active: users::ActiveModel = user.into();
            active.is_deleted = Set(true);
            active.update(&txn).await?
        };

        let revoked = user_auths::Entity::update_many()
            .col_expr(user_auths::Column::IsDeleted, Expr::value(true))
            .col_expr(user_auths::Column::UpdateTime, Expr::value(now_timestamp()))
            .filter(user_auths::Column::UserId.eq(id))
            .filter(user_auths::Column::IsDeleted.eq(false))
            .exec(&txn)
            .await?
            .rows_affected;

        txn.commit().await?;

        info!(user_id = id, revoked, "Deactivated user {}", user.username);
        Ok((User::from(user), revoked))
    }

    /// Hash and store a new password
    pub async fn set_password(&self, id: i32, password: &str) -> Result<(), AccountError> {
        let user = self.find_model(id).await?;
        let new_hash = self.hash(password.to_string()).await?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.update(&self.conn).await?;

        debug!(user_id = id, "Password updated");
        Ok(())
    }

    /// Verify the password of a non-deleted user.
    /// Unknown, deleted, and password-less users all yield `false`.
    pub async fn check_password(
        &self,
        phone_number: &str,
        password: &str,
    ) -> Result<bool, AccountError> {
        let user = users::Entity::find_active()
            .filter(users::Column::PhoneNumber.eq(phone_number))
            .one(&self.conn)
            .await?;

        let Some(user) = user else {
            return Ok(false);
        };

        let password_hash = user.password_hash;
        if password_hash.starts_with(UNUSABLE_PASSWORD_PREFIX) {
            return Ok(false);
        }

        let password = password.to_string();

        // Argon2 is CPU bound; keep it off the async workers
        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| AccountError::Internal(format!("Invalid password hash format: {e}")))?;

            Ok::<bool, AccountError>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await??;

        Ok(is_valid)
    }

    /// Stamp `last_login` with the current time.
    pub async fn record_login(&self, id: i32) -> Result<User, AccountError> {
        let user = self.find_model(id).await?;

        let mut active: users::ActiveModel = user.into();
        active.last_login = Set(Some(now_timestamp()));

        let model = active.update(&self.conn).await?;
        Ok(User::from(model))
    }

    async fn hash(&self, password: String) -> Result<String, AccountError> {
        validate_password(&password, &self.security)?;

        let config = self.security.clone();
        task::spawn_blocking(move || hash_password(&password, &config)).await?
    }
}

fn validate_password(password: &str, config: &SecurityConfig) -> Result<(), ValidationError> {
    if password.chars().count() < config.min_password_length {
        return Err(ValidationError::new(
            "password",
            format!(
                "Password must be at least {} characters",
                config.min_password_length
            ),
        ));
    }
    Ok(())
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| AccountError::Internal(format!("Invalid Argon2 params: {e}")))?;

    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AccountError::Internal(format!("Failed to hash password: {e}")))?;

    Ok(hash.to_string())
}

fn unusable_password() -> String {
    format!(
        "{UNUSABLE_PASSWORD_PREFIX}{}",
        uuid::Uuid::new_v4().simple()
    )
}
