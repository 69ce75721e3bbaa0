// Loot feed dashboard client

pub mod api;
pub mod feed;
pub mod filters;
pub mod metadata;
pub mod render;
pub mod state;

pub use api::{ClientError, FeedQuery, LootApiClient};
pub use feed::{spawn_feed, FeedConfig, FeedTasks, FeedUpdate};
pub use filters::CategoryFilter;
pub use metadata::{ItemMetadata, ItemMetadataClient};
pub use state::{DashboardState, ModalState};
