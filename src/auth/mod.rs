//! Authentication system for fittrack
//!
//! This module provides authentication functionality:
//! - Password hashing and verification
//! - Bearer token issuing and verification
//! - Resolution of a bearer token to the request principal

pub mod manager;
pub mod password;
pub mod resolver;
pub mod token;

pub use manager::AuthManager;
pub use password::{hash_password, verify_password, HashError};
pub use resolver::PrincipalResolver;
pub use token::{Claims, TokenService};
