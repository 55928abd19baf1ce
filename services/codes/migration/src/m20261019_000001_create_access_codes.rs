use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccessCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccessCodes::Code)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AccessCodes::VenueId).string().not_null())
                    .col(
                        ColumnDef::new(AccessCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccessCodes::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccessCodes::UsedAt).timestamp_with_time_zone())
                    .check(
                        Expr::col(AccessCodes::ExpiresAt).gt(Expr::col(AccessCodes::CreatedAt)),
                    )
                    .to_owned(),
            )
            .await?;

        // Issuance looks up the newest active code per venue.
        manager
            .create_index(
                Index::create()
                    .table(AccessCodes::Table)
                    .col(AccessCodes::VenueId)
                    .col(AccessCodes::CreatedAt)
                    .name("idx_access_codes_venue_created")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccessCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AccessCodes {
    Table,
    Code,
    VenueId,
    CreatedAt,
    ExpiresAt,
    UsedAt,
}
