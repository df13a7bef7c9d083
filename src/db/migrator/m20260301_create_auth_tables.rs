use crate::db::schema;
use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        manager.create_table(schema::users_table(backend)).await?;
        manager.create_table(schema::routers_table(backend)).await?;

        manager
            .create_table(schema::login_history_table(backend))
            .await?;
        for index in schema::login_history_indexes() {
            manager.create_index(index).await?;
        }

        manager
            .create_table(schema::assignments_table(backend))
            .await?;
        for index in schema::assignment_indexes() {
            manager.create_index(index).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserRouterAssignments).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserLoginHistory).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Routers).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await
    }
}
