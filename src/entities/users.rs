use sea_orm::entity::prelude::*;

use super::lifecycle::{self, Lifecycle, SoftDelete};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique, column_type = "String(StringLen::N(100))")]
    pub username: String,

    #[sea_orm(unique, column_type = "String(StringLen::N(100))")]
    pub email: String,

    /// Login identifier. Never changed after creation.
    #[sea_orm(unique, column_type = "String(StringLen::N(11))")]
    pub phone_number: String,

    /// Argon2id hash, or `!`-prefixed marker for an unusable password
    pub password_hash: String,

    pub last_login: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_admin: bool,

    #[sea_orm(default_value = false)]
    pub is_staff: bool,

    #[sea_orm(default_value = false)]
    pub is_superuser: bool,

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
