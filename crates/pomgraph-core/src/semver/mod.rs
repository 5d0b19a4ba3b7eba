pub mod comparator;
pub mod requirement;

pub use comparator::{canonical, compare, MavenVersion};
pub use requirement::VersionRequirement;
