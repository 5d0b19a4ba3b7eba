pub mod client;
pub mod guards;

pub use client::{dependency_type, ResolutionClient};
