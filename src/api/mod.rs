pub mod cache;
pub mod client;
pub mod types;

pub use cache::{get_cache_path, CacheConfig, DirectoryCache};
pub use client::{create_client, ApiClient, ResultsApi};
pub use types::{
    Category, CategoryId, Event, EventId, Participant, ParticipantId, ResultEntry, SaveReceipt,
    StoredResult,
};
