pub mod loot_queries;
