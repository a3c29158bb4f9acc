//! File system abstraction used by package discovery and the workspace oracle
//!
//! The pipeline never touches `std::fs` directly. Everything goes through
//! [`FileSystem`], which lets the [`OverlayFileSystem`] restrict what the
//! extractor can see and lets tests run against [`MockFileSystem`].

mod mock;
mod overlay;
mod real;
mod r#trait;

pub use mock::MockFileSystem;
pub use overlay::OverlayFileSystem;
pub use r#trait::{DirEntry, FileMetadata, FileSystem, FileType};
pub use real::RealFileSystem;
