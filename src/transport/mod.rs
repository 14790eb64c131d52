/// Filesystem discovery of trip source files.
pub mod fs;

pub use fs::{SourceFiles, SourceFormat, resolve_sources};
