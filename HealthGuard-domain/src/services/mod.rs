pub mod history;
pub mod users;

// Domain services
// This module contains business logic implementations.

// Re-export service traits and factory functions
pub use history::{create_default_history_service, HistoryService, HistoryServiceError, HistoryServiceTrait};
pub use users::{create_default_user_service, UserService, UserServiceError, UserServiceTrait};
