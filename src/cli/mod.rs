pub mod setup;
pub mod statistics;
pub mod ui;
