//! Core data types and I/O operations.

pub mod catalog;
pub mod dates;
pub mod loaders;
pub mod models;
pub mod writers;

pub use catalog::NeoCatalog;
pub use loaders::{load_approaches, load_neos, LoaderError};
pub use models::{CloseApproach, NearEarthObject};
pub use writers::{write_approaches, write_to_csv, write_to_json, OutputFormat, WriteError};
