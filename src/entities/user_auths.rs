use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::lifecycle::{self, Lifecycle, SoftDelete};

/// Kind of credential a [`Model`] row tracks. Stored as its numeric code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    #[sea_orm(num_value = 1)]
    Access,
    #[sea_orm(num_value = 2)]
    Refresh,
}

impl TokenType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Access => "access token",
            Self::Refresh => "refresh token",
        }
    }
}

impl FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "access" | "a" | "1" => Ok(Self::Access),
            "refresh" | "r" | "2" => Ok(Self::Refresh),
            other => Err(format!(
                "unknown token type '{other}', expected 'access' or 'refresh'"
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "user_auths")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Id of the owning user. Deliberately not a foreign key.
    pub user_id: i32,

    pub token_type: TokenType,

    #[sea_orm(default_value = 0)]
    pub device_login_count: i32,

    #[sea_orm(unique)]
    pub uuid: Uuid,

    pub create_time: String,

    pub update_time: String,

    #[sea_orm(default_value = false)]
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        lifecycle::stamp(&mut self.create_time, &mut self.update_time, insert);
        Ok(self)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "user id: {} - token type(a = 1, r = 2): {} - {}",
            self.user_id,
            self.token_type.to_value(),
            self.uuid
        )
    }
}

impl Lifecycle for Model {
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

impl SoftDelete for Entity {
    fn deleted_column() -> Column {
        Column::IsDeleted
    }
}
