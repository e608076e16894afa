// ABOUTME: Initial migration creating the users and photos collections
// ABOUTME: Photos carry their comments as JSON and deliberately have no foreign keys

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::FirstName).string().not_null().default(""))
                    .col(ColumnDef::new(Users::LastName).string().not_null().default(""))
                    .col(ColumnDef::new(Users::LoginName).string().not_null().default(""))
                    .col(ColumnDef::new(Users::Password).string().not_null().default(""))
                    .col(ColumnDef::new(Users::Location).string().not_null().default(""))
                    .col(ColumnDef::new(Users::Description).string().not_null().default(""))
                    .col(ColumnDef::new(Users::Occupation).string().not_null().default(""))
                    .to_owned(),
            )
            .await?;

        // Owners and comment authors may be removed later, so user_id is not a foreign key
        manager
            .create_table(
                Table::create()
                    .table(Photos::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Photos::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Photos::UserId).uuid().not_null())
                    .col(ColumnDef::new(Photos::FileName).string().not_null())
                    .col(ColumnDef::new(Photos::DateTime).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Photos::Comments).json().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_photos_user_id")
                    .table(Photos::Table)
                    .col(Photos::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Photos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    LoginName,
    Password,
    Location,
    Description,
    Occupation,
}

#[derive(DeriveIden)]
enum Photos {
    Table,
    Id,
    UserId,
    FileName,
    DateTime,
    Comments,
}
