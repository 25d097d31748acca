//! Shared configuration and error handling for GymDesk
//!
//! This crate provides common functionality used across the GymDesk session layer:
//! - Configuration management following 12-factor principles
//! - Error types and handling

pub mod config;
pub mod error;

pub use config::{AuthProvider, Config};
pub use error::{Error, Result};
