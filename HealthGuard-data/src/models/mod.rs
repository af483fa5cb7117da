// Storage models, one flat record per persisted document
pub mod history;
pub mod user;

pub use history::{HistoryRecord, NewHistoryRecord};
pub use user::{NewUserRecord, UserRecord};
