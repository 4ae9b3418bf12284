pub mod booking;
pub mod reservation;
