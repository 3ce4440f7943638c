//! Domain models for fittrack
//!
//! This module contains the core domain models used throughout the application.

pub mod preference;
pub mod progress;
pub mod user;

// Re-export commonly used types
pub use preference::{PreferenceRequest, UserPreference};
pub use progress::{ProgressLog, ProgressLogFields, ProgressLogRequest};
pub use user::{LoginRequest, LoginResponse, NewUser, Principal, RegisterRequest, User};
