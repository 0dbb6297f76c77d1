//! Shared library for the AnimeNox catalog.
//!
//! This crate provides common functionality used by the catalog crate:
//! - Canonical anime models
//! - Text and image helpers
//! - Configuration management
//! - Logging infrastructure
//! - Local favorites/history storage

pub mod config;
pub mod helpers;
pub mod library;
pub mod logging;
pub mod models;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use library::{Library, RecentEntry};
pub use logging::LogConfig;
pub use models::*;
pub use storage::LocalStore;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
