// ABOUTME: SeaORM migration module for the document store schema
// ABOUTME: Applied on startup before the server accepts requests

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000001_create_users_and_photos::Migration)]
    }
}

pub mod m20250301_000001_create_users_and_photos;
