//! Fetch serialized story parts and render them into styled documents.
//!
//! Network access goes through a [`Fetcher`] backed by an optional
//! content-addressed [`DiskCache`]; fetched HTML is walked into an ordered list
//! of [`ContentBlock`]s and assembled into a [`RenderedPage`].

// Re-export modules
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod pages;
pub mod parsers;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use cache::{DiskCache, cache_key};
pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use fetcher::Fetcher;
pub use pages::ContentUnit;
pub use results::{ContentBlock, RenderedPage, StyledWord, WordStyle};
