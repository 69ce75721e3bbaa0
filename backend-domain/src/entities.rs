// Domain entities
pub mod config;
pub mod loot_entry;
pub mod loot_query;

pub use config::*;
pub use loot_entry::*;
pub use loot_query::*;
