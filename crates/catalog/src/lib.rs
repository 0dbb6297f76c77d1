//! Anime catalog library for browsing and searching anime metadata.
//!
//! This library wraps a Consumet-style metadata API behind a gateway that
//! always yields renderable results, and a listing controller that drives a
//! paginated, searchable grid view.

pub mod api;
pub mod controller;
pub mod debounce;
pub mod fallback;
pub mod gateway;
pub mod normalize;

pub use api::{ApiError, MetadataClient};
pub use controller::{ListingController, ListingState, LOAD_ERROR_MESSAGE};
pub use debounce::Debouncer;
pub use gateway::{CatalogSource, FetchGateway, ListingRequest, Section};
