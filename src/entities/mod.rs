pub mod booking;
pub mod travel_option;
pub mod user;
