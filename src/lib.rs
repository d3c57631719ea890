//! Near-Earth object catalog ingestion and close-approach export.
//!
//! This crate provides tools for:
//! - Loading the NEO catalog CSV and the close-approach JSON document
//! - Linking every close approach to its NEO by designation
//! - Writing a selection of close approaches back out as CSV or JSON
//!
//! Selecting which approaches to write (filters, ordering, limits) is left to
//! the caller; [`NeoCatalog::approaches`] is an ordinary iterator.
//!
//! # Example
//!
//! ```no_run
//! use neo_pipeline::{core::writers::write_approaches, NeoCatalog, OutputFormat, PipelineConfig};
//! use std::path::Path;
//!
//! let config = PipelineConfig::default();
//! let catalog = NeoCatalog::from_files("neos.csv", "cad.json", &config).unwrap();
//!
//! let hazardous = catalog
//!     .approaches()
//!     .filter(|a| a.neo().map_or(false, |neo| neo.is_hazardous()))
//!     .take(10);
//! write_approaches(Path::new("hazardous.json"), hazardous, OutputFormat::Json).unwrap();
//! ```

pub mod config;
pub mod core;

pub use config::{ApproachJsonConfig, NeoCsvConfig, OutputConfig, PipelineConfig};
pub use crate::core::catalog::NeoCatalog;
pub use crate::core::models::{CloseApproach, NearEarthObject};
pub use crate::core::writers::OutputFormat;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
