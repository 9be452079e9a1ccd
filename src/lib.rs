pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod output;
pub mod search;
pub mod server;

pub use error::{CatalogError, CatalogResult};
