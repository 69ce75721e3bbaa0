pub mod loot_stream_hub;

pub use loot_stream_hub::LootStreamHub;
