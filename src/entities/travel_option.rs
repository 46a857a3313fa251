use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum TravelMode {
    #[sea_orm(string_value = "Flight")]
    Flight,
    #[sea_orm(string_value = "Train")]
    Train,
    #[sea_orm(string_value = "Bus")]
    Bus,
}

/// A bookable departure. `available_seats` is only ever changed through
/// guarded updates so it cannot drop below zero.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "travel_option")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub mode: TravelMode,
    pub source: String,
    pub destination: String,
    pub departure_time: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub available_seats: i32,
}

impl Model {
    pub fn has_available_seats(&self) -> bool {
        self.available_seats > 0
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} from {} to {} on {}",
            self.mode.to_value(),
            self.source,
            self.destination,
            self.departure_time.format("%Y-%m-%d %H:%M")
        )
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
