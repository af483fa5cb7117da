// HealthGuard Domain
// This crate contains the business logic for the HealthGuard Vision application

// Image analysis: preprocessing, inference and interpretation
pub mod analysis;

// Services that implement business logic
pub mod services;

// Authentication
pub mod auth;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the database module from the data crate for convenience
pub use health_guard_data::database;

// Testing utilities - only available with mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
