//! Append-only trade ledger

use sea_orm_migration::prelude::*;

use super::m20261019_000001_create_users_and_profiles::Users;
use super::m20261019_000003_create_stocks::Stocks;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Trades::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Trades::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Trades::UserId).integer().not_null())
                    .col(ColumnDef::new(Trades::StockId).integer().not_null())
                    .col(ColumnDef::new(Trades::TradeType).string_len(4).not_null())
                    .col(ColumnDef::new(Trades::Quantity).integer().not_null())
                    .col(ColumnDef::new(Trades::Price).decimal_len(10, 2).not_null())
                    .col(
                        ColumnDef::new(Trades::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trades_user_id")
                            .from(Trades::Table, Trades::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trades_stock_id")
                            .from(Trades::Table, Trades::StockId)
                            .to(Stocks::Table, Stocks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Analytics reads a user's trades ordered by time
        manager
            .create_index(
                Index::create()
                    .name("idx_trades_user_timestamp")
                    .table(Trades::Table)
                    .col(Trades::UserId)
                    .col(Trades::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Trades::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Trades {
    Table,
    Id,
    UserId,
    StockId,
    TradeType,
    Quantity,
    Price,
    Timestamp,
}
