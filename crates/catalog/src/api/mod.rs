//! Metadata API client implementation.
//!
//! A thin client for the Consumet AniList meta provider. Each call performs
//! exactly one HTTP request; recovery is the gateway's job.

pub mod client;
pub mod error;
pub mod types;

pub use client::MetadataClient;
pub use error::ApiError;
pub use types::*;
