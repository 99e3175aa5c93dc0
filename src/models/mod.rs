pub mod booking;
pub mod location;
pub mod pending;
pub mod reservation;
pub mod seat_key;
pub mod snapshot;
