// Domain entities and value objects
pub mod conversions;
pub mod history;
pub mod user;

// Re-export common types for easier imports
pub use history::{DataExport, HistoryEntry};
pub use user::{NewUser, User};
