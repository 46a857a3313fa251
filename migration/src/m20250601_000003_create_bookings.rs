use sea_orm_migration::{prelude::*, schema::*};

use super::m20250601_000001_create_users::User;
use super::m20250601_000002_create_travel_options::TravelOption;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(uuid(Booking::UserId).not_null())
                    .col(uuid(Booking::TravelOptionId).not_null())
                    .col(integer(Booking::NumberOfSeats).not_null())
                    .col(decimal_len(Booking::TotalPrice, 10, 2).not_null())
                    .col(string_len(Booking::Status, 10).not_null())
                    .col(
                        timestamp_with_time_zone(Booking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Booking::NumberOfSeats).gte(1))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_user")
                            .from(Booking::Table, Booking::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_travel_option")
                            .from(Booking::Table, Booking::TravelOptionId)
                            .to(TravelOption::Table, TravelOption::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_user")
                    .table(Booking::Table)
                    .col(Booking::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    Table,
    Id,
    UserId,
    TravelOptionId,
    NumberOfSeats,
    TotalPrice,
    Status,
    CreatedAt,
}
