use sea_orm_migration::prelude::*;

mod m20260301_create_auth_tables;
mod m20260308_add_user_sessions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_create_auth_tables::Migration),
            Box::new(m20260308_add_user_sessions::Migration),
        ]
    }
}
