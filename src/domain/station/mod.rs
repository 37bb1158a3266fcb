//! Station aggregate

pub mod model;

pub use model::{Station, StationStatus};
