pub mod repositories;

pub use repositories::{MockBookingRepo, MockReservationRepo};
