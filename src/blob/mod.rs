//! Azure Blob Storage operations
//!
//! This module provides single-blob transfer functionality: upload,
//! download, and property inspection against one container.

pub mod models;
pub mod transfer;

// Re-export commonly used types
pub use models::*;
pub use transfer::{create_blob_transfer, BlobTransfer};
