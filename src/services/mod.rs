// Service exports
pub mod catalog;
pub mod chat;
pub mod favorites;
pub mod llm;
pub mod storage;

pub use catalog::{Catalog, CatalogError};
pub use chat::{ChatSession, ChatError, ChatLimits, UserType, PresetPrompt, PRESET_PROMPTS, build_system_prompt};
pub use favorites::FavoritesStore;
pub use llm::{ChatTransport, CompletionClient, CompletionSettings, LlmError, ProxyTransport};
pub use storage::{KeyValueStore, MemoryStore, FileStore, StorageError, FAVORITES_KEY, MESSAGE_COUNT_KEY};
