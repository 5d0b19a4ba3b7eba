//! On-disk persistence of the registry response cache.

pub mod cache_file;
pub mod schema;

pub use cache_file::{cache_path, load_cache, write_cache, CACHE_EXTENSION};
