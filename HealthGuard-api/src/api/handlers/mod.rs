pub mod auth;
pub mod health;
pub mod history;
pub mod predict;
pub mod profile;
pub mod users;

// Tests module
#[cfg(test)]
mod tests;

// Re-export handlers for easier imports
pub use auth::{login, refresh_token, signup};
pub use health::health_check;
pub use history::{delete_history, export_history, get_history};
pub use predict::predict;
pub use profile::{change_password, get_profile, update_profile};
pub use users::{get_user_history, list_users};
