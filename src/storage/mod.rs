//! Storage implementations for persisted view state

pub mod cache;
pub mod file;
pub mod in_memory;
pub mod preferences;

pub use cache::CacheStore;
pub use file::JsonFileStore;
pub use in_memory::InMemoryKeyValueStore;
pub use preferences::PreferenceStore;
