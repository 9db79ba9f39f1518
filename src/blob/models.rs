//! Data models for blob storage operations
//!
//! This module defines the data structures used for blob transfers,
//! including requests and blob property summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Properties of a stored blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobInfo {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub last_modified: DateTime<Utc>,
    pub etag: String,
}

/// Request for uploading a local file as a block blob
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_path: PathBuf,
    pub blob_name: String,
    pub content_type: Option<String>,
}

/// Request for downloading a blob to a local file
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub blob_name: String,
    pub output_path: PathBuf,
}
