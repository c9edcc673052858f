//! Create role table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Role::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Role::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Role::Name).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(Role::Permissions).integer().not_null().default(0))
                    .col(ColumnDef::new(Role::IsDefault).boolean().not_null().default(false))
                    .to_owned(),
            )
            .await?;

        // Index: is_default (for default role lookup on registration)
        manager
            .create_index(
                Index::create()
                    .name("idx_role_is_default")
                    .table(Role::Table)
                    .col(Role::IsDefault)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Role::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Role {
    Table,
    Id,
    Name,
    Permissions,
    IsDefault,
}
