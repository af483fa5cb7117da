// Repository module structure
pub mod errors;
mod backend;
mod history;
mod in_memory;
mod storage;
mod users;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use backend::{timestamp_now, StorageBackend};
pub use history::{HistoryRepository, HistoryRepositoryTrait};
pub use in_memory::InMemoryStorage;
pub use users::{UserRepository, UserRepositoryTrait};
