//! Core business logic abstractions

pub mod analytics;
pub mod cache;
pub mod config;
pub mod error;
pub mod fund;
pub mod log;
pub mod window;

// Re-export main types for cleaner imports
pub use analytics::{StatisticsResult, compute_basics};
pub use error::FundError;
pub use fund::{FundDirectory, FundInfo, NavProvider, NetValuePoint, Page};
pub use window::WindowAssembler;
