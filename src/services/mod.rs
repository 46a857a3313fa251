pub mod reservation;
pub mod search;
