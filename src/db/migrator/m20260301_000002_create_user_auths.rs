use crate::entities::{prelude::*, user_auths};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(UserAuths)
                    .if_not_exists()
                    .check(Expr::col(user_auths::Column::DeviceLoginCount).gte(0))
                    .to_owned(),
            )
            .await?;

        // user_id is indexed but intentionally carries no foreign key
        manager
            .create_index(
                Index::create()
                    .name("user_id_index")
                    .table(UserAuths)
                    .col(user_auths::Column::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserAuths).to_owned())
            .await?;

        Ok(())
    }
}
