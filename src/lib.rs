//! blobfetch - Azure Blob Storage transfer tool
//!
//! A command-line tool for moving single blobs between Azure Blob Storage
//! and the local filesystem, with device-code authentication and console
//! progress reporting.

pub mod auth;
pub mod blob;
pub mod cli;
pub mod config;
pub mod error;
pub mod utils;

// Re-export commonly used types
pub use error::{BlobfetchError, Result};
