use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TravelOption::Table)
                    .if_not_exists()
                    .col(uuid(TravelOption::Id).primary_key())
                    .col(string_len(TravelOption::Mode, 10).not_null())
                    .col(string_len(TravelOption::Source, 100).not_null())
                    .col(string_len(TravelOption::Destination, 100).not_null())
                    .col(timestamp_with_time_zone(TravelOption::DepartureTime).not_null())
                    .col(decimal_len(TravelOption::Price, 10, 2).not_null())
                    .col(integer(TravelOption::AvailableSeats).not_null())
                    .check(Expr::col(TravelOption::AvailableSeats).gte(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_travel_option_departure_time")
                    .table(TravelOption::Table)
                    .col(TravelOption::DepartureTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TravelOption::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TravelOption {
    Table,
    Id,
    Mode,
    Source,
    Destination,
    DepartureTime,
    Price,
    AvailableSeats,
}
