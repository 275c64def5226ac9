//! Data access for the hadith dataset.
//!
//! - `ApiClient`: HTTP calls to the same-origin API routes
//! - `HadithService`: read/write-through caching on top of the client
//! - `FetchFailure`: separates "not found" from "try again" for callers

pub mod client;
pub mod error;
pub mod service;

pub use client::ApiClient;
pub use error::ApiError;
pub use service::{combine, FetchFailure, HadithService};
