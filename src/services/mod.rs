pub mod emissions;
pub mod geo;
pub mod store;
pub mod trips;
