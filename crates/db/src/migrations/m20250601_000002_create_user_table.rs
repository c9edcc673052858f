//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(User::Email).string_len(120).not_null().unique_key())
                    .col(ColumnDef::new(User::Name).string_len(64))
                    .col(ColumnDef::new(User::Location).string_len(64))
                    .col(ColumnDef::new(User::AboutMe).text())
                    .col(ColumnDef::new(User::AvatarUrl).string_len(200))
                    .col(ColumnDef::new(User::Token).string_len(64).unique_key())
                    .col(ColumnDef::new(User::RoleId).string_len(32))
                    .col(
                        ColumnDef::new(User::MemberSince)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(User::LastSeen)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_role")
                            .from(User::Table, User::RoleId)
                            .to(Role::Table, Role::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: role_id
        manager
            .create_index(
                Index::create()
                    .name("idx_user_role_id")
                    .table(User::Table)
                    .col(User::RoleId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    Email,
    Name,
    Location,
    AboutMe,
    AvatarUrl,
    Token,
    RoleId,
    MemberSince,
    LastSeen,
}

#[derive(Iden)]
enum Role {
    Table,
    Id,
}
