//! Single-blob transfer engine
//!
//! This module provides the [`BlobTransfer`] struct: a thin client over one
//! storage container that can download a blob to a local file, upload a
//! local file as a block blob, and fetch blob properties. The container
//! client is constructed lazily on first use and cached for the life of the
//! process.

use crate::auth::provider::AzureAuthProvider;
use crate::blob::models::{BlobInfo, DownloadRequest, UploadRequest};
use crate::error::{BlobfetchError, Result};
use crate::utils::progress::TransferProgress;
use azure_storage_blobs::blob::{BlobBlockType, BlockList};
use azure_storage_blobs::prelude::*;
use chrono::Utc;
use futures::StreamExt;
use std::sync::{Arc, OnceLock};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

/// Blob transfer client bound to a single container
pub struct BlobTransfer {
    storage_account: String,
    container_name: String,
    chunk_size: u64,
    auth_provider: Arc<dyn AzureAuthProvider>,
    container_client: OnceLock<ContainerClient>,
}

impl BlobTransfer {
    /// Create a new BlobTransfer instance
    pub fn new(
        auth_provider: Arc<dyn AzureAuthProvider>,
        storage_account: String,
        container_name: String,
        chunk_size: u64,
    ) -> Result<Self> {
        if chunk_size == 0 {
            return Err(BlobfetchError::invalid_argument(
                "chunk size must be at least one byte",
            ));
        }
        Ok(Self {
            storage_account,
            container_name,
            chunk_size,
            auth_provider,
            container_client: OnceLock::new(),
        })
    }

    /// The container client, created on first use and reused afterwards
    fn container(&self) -> &ContainerClient {
        self.container_client.get_or_init(|| {
            debug!(
                "initializing container client for https://{}.blob.core.windows.net/{}",
                self.storage_account, self.container_name
            );
            let token_credential = self.auth_provider.get_token_credential();
            BlobServiceClient::new(&self.storage_account, token_credential)
                .container_client(&self.container_name)
        })
    }

    /// Get blob properties without downloading content
    pub async fn properties(&self, name: &str) -> Result<BlobInfo> {
        if name.trim().is_empty() {
            return Err(BlobfetchError::invalid_argument("Blob name cannot be empty"));
        }

        let blob_client = self.container().blob_client(name);
        let properties = blob_client
            .get_properties()
            .await
            .map_err(|e| map_blob_error(name, e))?;

        let size = properties.blob.properties.content_length;
        let content_type = properties.blob.properties.content_type.clone();
        let last_modified = {
            let timestamp = properties.blob.properties.last_modified.unix_timestamp();
            chrono::DateTime::from_timestamp(timestamp, 0).unwrap_or_else(Utc::now)
        };
        let etag = properties.blob.properties.etag.to_string();

        Ok(BlobInfo {
            name: name.to_string(),
            size,
            content_type,
            last_modified,
            etag,
        })
    }

    /// Download a blob to a local file, advancing `progress` as chunks land.
    ///
    /// The destination is created and pre-sized to the blob's content length
    /// before the first chunk is requested. Returns the number of bytes
    /// written.
    pub async fn download_to_file(
        &self,
        request: &DownloadRequest,
        progress: &TransferProgress,
    ) -> Result<u64> {
        let name = request.blob_name.as_str();
        if name.trim().is_empty() {
            return Err(BlobfetchError::invalid_argument("Blob name cannot be empty"));
        }

        let blob_client = self.container().blob_client(name);

        let properties = blob_client
            .get_properties()
            .await
            .map_err(|e| map_blob_error(name, e))?;
        let size = properties.blob.properties.content_length;

        let mut file = tokio::fs::File::create(&request.output_path).await?;
        file.set_len(size).await?;

        // Azure rejects ranged reads of zero-byte blobs with HTTP 416, so
        // an empty destination file is the whole transfer.
        if size == 0 {
            file.flush().await?;
            progress.finish();
            return Ok(0);
        }

        let mut written: u64 = 0;
        let mut stream = blob_client.get().chunk_size(self.chunk_size).into_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                BlobfetchError::azure_api(format!("Failed to download blob: {e}"))
            })?;
            let data = chunk.data.collect().await.map_err(|e| {
                BlobfetchError::azure_api(format!("Failed to read blob chunk: {e}"))
            })?;
            file.write_all(&data).await?;
            written += data.len() as u64;
            progress.advance(data.len() as u64);
        }

        file.flush().await?;
        progress.finish();

        info!("downloaded '{}' ({} bytes)", name, written);
        Ok(written)
    }

    /// Upload a local file as a block blob, advancing `progress` per chunk.
    ///
    /// Files that fit in a single chunk go up in one `put_block_blob`;
    /// larger files are staged as uncommitted blocks and committed with a
    /// block list.
    pub async fn upload_file(
        &self,
        request: &UploadRequest,
        progress: &TransferProgress,
    ) -> Result<BlobInfo> {
        let name = request.blob_name.as_str();
        if name.trim().is_empty() {
            return Err(BlobfetchError::invalid_argument("Blob name cannot be empty"));
        }

        let content_type = request.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&request.file_path)
                .first_or_octet_stream()
                .to_string()
        });

        let mut file = tokio::fs::File::open(&request.file_path).await?;
        let size = file.metadata().await?.len();

        let blob_client = self.container().blob_client(name);

        if size <= self.chunk_size {
            let mut content = Vec::with_capacity(size as usize);
            file.read_to_end(&mut content).await?;

            blob_client
                .put_block_blob(content)
                .content_type(content_type.clone())
                .await
                .map_err(|e| BlobfetchError::azure_api(format!("Failed to upload blob: {e}")))?;
            progress.advance(size);
        } else {
            let mut blocks = Vec::new();
            let mut index = 0usize;
            loop {
                let buffer = read_chunk(&mut file, self.chunk_size as usize).await?;
                if buffer.is_empty() {
                    break;
                }
                let chunk_len = buffer.len() as u64;
                let block_id = block_id_for(index);

                blob_client
                    .put_block(block_id.clone(), buffer)
                    .await
                    .map_err(|e| {
                        BlobfetchError::azure_api(format!("Failed to stage block {index}: {e}"))
                    })?;

                blocks.push(BlobBlockType::new_uncommitted(block_id));
                progress.advance(chunk_len);
                index += 1;
            }

            blob_client
                .put_block_list(BlockList { blocks })
                .content_type(content_type.clone())
                .await
                .map_err(|e| {
                    BlobfetchError::azure_api(format!("Failed to commit block list: {e}"))
                })?;
        }

        progress.finish();
        info!("uploaded '{}' ({} bytes)", name, size);

        self.properties(name).await
    }

    /// Get the container name
    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    /// Get the storage account name
    pub fn storage_account(&self) -> &str {
        &self.storage_account
    }
}

/// Fixed-width block identifier; Azure requires every id in a block list to
/// have the same encoded length.
fn block_id_for(index: usize) -> String {
    format!("{index:032x}")
}

/// Read up to `limit` bytes, short only at end of file.
async fn read_chunk(file: &mut tokio::fs::File, limit: usize) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; limit];
    let mut filled = 0usize;
    while filled < limit {
        let n = file.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buffer.truncate(filled);
    Ok(buffer)
}

/// Map an Azure SDK error to a blob-not-found where the service reported a
/// missing blob, and to a generic API error otherwise.
fn map_blob_error(name: &str, error: azure_core::Error) -> BlobfetchError {
    let message = error.to_string().to_lowercase();
    if message.contains("404") || message.contains("not found") || message.contains("blobnotfound")
    {
        BlobfetchError::blob_not_found(name)
    } else {
        BlobfetchError::azure_api(format!("Failed to access blob '{name}': {error}"))
    }
}

/// Helper function to create a BlobTransfer from configuration
pub fn create_blob_transfer(config: &crate::config::Config) -> Result<BlobTransfer> {
    use crate::auth::provider::ChainedCredentialProvider;

    config.validate()?;
    debug!("transfer target {}", config.container_endpoint()?);

    let auth_provider = Arc::new(ChainedCredentialProvider::new(
        config.credential_mode,
        &config.tenant_id,
        &config.client_id,
    )?) as Arc<dyn AzureAuthProvider>;

    BlobTransfer::new(
        auth_provider,
        config.storage_account.clone(),
        config.container_name.clone(),
        config.chunk_size_bytes(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_ids_have_fixed_width() {
        let first = block_id_for(0);
        let large = block_id_for(50_000);
        assert_eq!(first.len(), 32);
        assert_eq!(large.len(), 32);
        assert_ne!(first, large);
    }

    #[test]
    fn test_block_ids_are_ordered() {
        // Lexicographic order must follow block order for readability in
        // diagnostics; hex with leading zeroes guarantees it.
        let ids: Vec<String> = (0..300).map(block_id_for).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_not_found_mapping() {
        let err = azure_core::error::Error::message(
            azure_core::error::ErrorKind::Other,
            "HttpError { status: 404, error_code: \"BlobNotFound\" }",
        );
        match map_blob_error("missing.bin", err) {
            BlobfetchError::BlobNotFound { name } => assert_eq!(name, "missing.bin"),
            other => panic!("expected BlobNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_other_errors_map_to_azure_api() {
        let err = azure_core::error::Error::message(
            azure_core::error::ErrorKind::Io,
            "connection reset",
        );
        match map_blob_error("asset.bin", err) {
            BlobfetchError::AzureApiError(msg) => {
                assert!(msg.contains("asset.bin"));
                assert!(msg.contains("connection reset"));
            }
            other => panic!("expected AzureApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_read_chunk_respects_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        tokio::fs::write(&path, vec![7u8; 10]).await.unwrap();

        let mut file = tokio::fs::File::open(&path).await.unwrap();
        let first = read_chunk(&mut file, 4).await.unwrap();
        let second = read_chunk(&mut file, 4).await.unwrap();
        let third = read_chunk(&mut file, 4).await.unwrap();
        let end = read_chunk(&mut file, 4).await.unwrap();

        assert_eq!(first.len(), 4);
        assert_eq!(second.len(), 4);
        assert_eq!(third.len(), 2);
        assert!(end.is_empty());
    }

    #[test]
    fn test_transfer_rejects_zero_chunk_size() {
        use crate::config::CredentialMode;

        let provider = Arc::new(
            crate::auth::provider::ChainedCredentialProvider::new(
                CredentialMode::DeviceCode,
                "tenant",
                "client",
            )
            .unwrap(),
        ) as Arc<dyn AzureAuthProvider>;

        let result = BlobTransfer::new(provider, "acct".to_string(), "files".to_string(), 0);
        assert!(result.is_err());
    }
}
