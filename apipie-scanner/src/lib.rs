//! Crawling and endpoint extraction engine.
//!
//! [`Crawler`] walks a site breadth-first, runs every page and script it
//! finds through the [`extract`] registry and folds the results into one
//! [`Endpoint`] per URL.

pub mod client;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod infer;
pub mod model;
pub mod resolve;

pub use client::{ClientConfig, HttpClient};
pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use extract::{Extractor, ExtractorSet};
pub use model::{Endpoint, EndpointStore, Hit, Kind};
