pub mod caching;
pub mod east_money;

pub use caching::CachingNavProvider;
pub use east_money::EastMoneyProvider;
