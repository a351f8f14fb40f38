//! Create community ban table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CommunityBan::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CommunityBan::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CommunityBan::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CommunityBan::CommunityId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CommunityBan::ModeratorId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CommunityBan::Reason).text().not_null())
                    .col(
                        ColumnDef::new(CommunityBan::IsPermanent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CommunityBan::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CommunityBan::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_community_ban_user")
                            .from(CommunityBan::Table, CommunityBan::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_community_ban_moderator")
                            .from(CommunityBan::Table, CommunityBan::ModeratorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_community_ban_community")
                            .from(CommunityBan::Table, CommunityBan::CommunityId)
                            .to(Community::Table, Community::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, community_id) for active-ban lookups. Not unique:
        // expired rows stay behind as audit history.
        manager
            .create_index(
                Index::create()
                    .name("idx_community_ban_user_community")
                    .table(CommunityBan::Table)
                    .col(CommunityBan::UserId)
                    .col(CommunityBan::CommunityId)
                    .to_owned(),
            )
            .await?;

        // Index: expires_at (activity predicate)
        manager
            .create_index(
                Index::create()
                    .name("idx_community_ban_expires_at")
                    .table(CommunityBan::Table)
                    .col(CommunityBan::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CommunityBan::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CommunityBan {
    Table,
    Id,
    UserId,
    CommunityId,
    ModeratorId,
    Reason,
    IsPermanent,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Community {
    Table,
    Id,
}
