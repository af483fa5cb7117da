// Public entities for the HealthGuard API
// This module contains data structures that are shared across the application boundary

// Common entities for error and message responses
pub mod common;

// Auth entities
pub mod auth;

// User and profile entities
pub mod user;

// Scan history entities
pub mod history;

// Prediction responses
pub mod analysis;
