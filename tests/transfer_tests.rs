use blobfetch::blob::{create_blob_transfer, BlobInfo, DownloadRequest, UploadRequest};
use blobfetch::config::{Config, CredentialMode};
use blobfetch::utils::progress::TransferProgress;
use blobfetch::BlobfetchError;
use std::path::PathBuf;

fn transfer_config() -> Config {
    Config {
        tenant_id: "12345678-1234-1234-1234-123456789012".to_string(),
        client_id: "87654321-4321-4321-4321-210987654321".to_string(),
        storage_account: "mystorageaccount".to_string(),
        container_name: "assets".to_string(),
        ..Config::default()
    }
}

#[test]
fn test_create_blob_transfer_from_config() {
    let transfer = create_blob_transfer(&transfer_config()).unwrap();
    assert_eq!(transfer.storage_account(), "mystorageaccount");
    assert_eq!(transfer.container_name(), "assets");
}

#[test]
fn test_create_blob_transfer_rejects_incomplete_config() {
    let mut config = transfer_config();
    config.container_name.clear();

    match create_blob_transfer(&config) {
        Err(BlobfetchError::ConfigError(msg)) => assert!(msg.contains("Container")),
        Err(other) => panic!("expected a config error, got {other:?}"),
        Ok(_) => panic!("expected a config error, got a transfer client"),
    }
}

#[test]
fn test_auto_mode_config_builds_transfer() {
    let mut config = transfer_config();
    config.credential_mode = CredentialMode::Auto;
    assert!(create_blob_transfer(&config).is_ok());
}

#[test]
fn test_blob_info_serialization() {
    let info = BlobInfo {
        name: "model.bin".to_string(),
        size: 1024,
        content_type: "application/octet-stream".to_string(),
        last_modified: chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        etag: "\"0x8D9F\"".to_string(),
    };

    let json = serde_json::to_string(&info).unwrap();
    let parsed: BlobInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.name, "model.bin");
    assert_eq!(parsed.size, 1024);
    assert_eq!(parsed.etag, info.etag);
}

#[test]
fn test_request_models_carry_paths() {
    let upload = UploadRequest {
        file_path: PathBuf::from("/tmp/model.bin"),
        blob_name: "model.bin".to_string(),
        content_type: None,
    };
    assert_eq!(upload.file_path, PathBuf::from("/tmp/model.bin"));

    let download = DownloadRequest {
        blob_name: "model.bin".to_string(),
        output_path: PathBuf::from("model.bin"),
    };
    assert_eq!(download.blob_name, download.output_path.to_string_lossy());
}

#[test]
fn test_progress_tracks_chunked_transfer() {
    // Simulate the byte deltas a chunked download reports
    let total: u64 = 10 * 1024 * 1024;
    let chunk: u64 = 4 * 1024 * 1024;
    let progress = TransferProgress::bytes(total, "Downloading model.bin", true);

    let mut remaining = total;
    while remaining > 0 {
        let step = remaining.min(chunk);
        progress.advance(step);
        remaining -= step;
    }
    progress.finish();

    assert_eq!(progress.position(), total);
    assert_eq!(progress.length(), Some(total));
}
