use furniture_backend::api::error::AppError;
use furniture_backend::services::uploads::UploadStorage;
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;

const MAX_SIZE: usize = 10 * 1024 * 1024;

fn storage(dir: &TempDir) -> UploadStorage {
    UploadStorage::new(
        dir.path().join("temp-uploads"),
        dir.path().join("uploads"),
        MAX_SIZE,
    )
}

fn temp_file_count(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path().join("temp-uploads"))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_stage_supported_mime_types() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir);

    let mut seen = HashSet::new();
    for mime in ["image/jpeg", "image/png", "image/webp"] {
        let staged = storage
            .stage("photo.png", Some(mime), b"plain test payload")
            .await
            .unwrap();

        assert!(staged.path.starts_with("/temp-uploads/"));
        assert!(staged.path.ends_with(&staged.filename));
        assert!(
            dir.path()
                .join("temp-uploads")
                .join(&staged.filename)
                .exists()
        );
        // Every staging call must mint a fresh token
        assert!(seen.insert(staged.filename));
    }
}

#[tokio::test]
async fn test_stage_rejects_unsupported_mime_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir);

    for mime in ["application/pdf", "text/html", "image/gif", "video/mp4"] {
        let err = storage
            .stage("upload.bin", Some(mime), b"payload")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaType(_)));
    }

    assert_eq!(temp_file_count(&dir), 0);
}

#[tokio::test]
async fn test_stage_rejects_missing_content_type_and_empty_payload() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir);

    let err = storage.stage("photo.jpg", None, b"payload").await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = storage
        .stage("photo.jpg", Some("image/jpeg"), b"")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    assert_eq!(temp_file_count(&dir), 0);
}

#[tokio::test]
async fn test_stage_enforces_size_limit() {
    let dir = tempfile::tempdir().unwrap();
    let storage = UploadStorage::new(
        dir.path().join("temp-uploads"),
        dir.path().join("uploads"),
        16,
    );

    let err = storage
        .stage("photo.jpg", Some("image/jpeg"), &[0u8; 17])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PayloadTooLarge(_)));

    assert!(
        storage
            .stage("photo.jpg", Some("image/jpeg"), &[0u8; 16])
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_stage_rejects_mismatched_content() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir);

    // A PDF declared as an image must not slip through
    let err = storage
        .stage("photo.png", Some("image/png"), b"%PDF-1.5 fake document")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnsupportedMediaType(_)));

    // A real PNG signature declared as JPEG is still an allowed image
    let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    assert!(
        storage
            .stage("photo.jpg", Some("image/jpeg"), &png)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_stage_derives_extension_with_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir);

    let staged = storage
        .stage("photo.WEBP", Some("image/webp"), b"payload")
        .await
        .unwrap();
    assert!(staged.filename.ends_with(".webp"));

    let staged = storage
        .stage("no-extension", Some("image/jpeg"), b"payload")
        .await
        .unwrap();
    assert!(staged.filename.ends_with(".jpg"));
}

#[tokio::test]
async fn test_promote_moves_file_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir);

    let content = b"the exact image bytes";
    let staged = storage
        .stage("photo.jpg", Some("image/jpeg"), content)
        .await
        .unwrap();

    let permanent = storage.promote(&staged.path).await.unwrap();
    assert_eq!(permanent, format!("/uploads/{}", staged.filename));

    // Temp copy is gone, permanent copy is byte-identical
    assert!(
        !dir.path()
            .join("temp-uploads")
            .join(&staged.filename)
            .exists()
    );
    let promoted = std::fs::read(dir.path().join("uploads").join(&staged.filename)).unwrap();
    assert_eq!(promoted, content);

    // Promotion is not idempotent by design
    let err = storage.promote(&staged.path).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_promote_unknown_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir);

    let err = storage
        .promote("/temp-uploads/does-not-exist.jpg")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_promote_rejects_bad_paths() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir);

    for path in ["", "/temp-uploads/", "/temp-uploads/..", ".."] {
        let err = storage.promote(path).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)), "path: {:?}", path);
    }
}

#[tokio::test]
async fn test_cleanup_reports_per_path_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir);

    let staged = storage
        .stage("photo.jpg", Some("image/jpeg"), b"payload")
        .await
        .unwrap();

    let results = storage
        .cleanup(&[
            staged.path.clone(),
            "/temp-uploads/missing.jpg".to_string(),
        ])
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].path, staged.path);
    assert!(results[0].success);
    assert!(!results[1].success);
    assert_eq!(results[1].reason.as_deref(), Some("not found"));

    assert_eq!(temp_file_count(&dir), 0);
}

#[tokio::test]
async fn test_cleanup_with_no_paths_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir);

    assert!(storage.cleanup(&[]).await.is_empty());

    // Empty entries from abandoned forms count as already cleaned
    let results = storage.cleanup(&["".to_string(), "   ".to_string()]).await;
    assert!(results.iter().all(|outcome| outcome.success));
}

#[tokio::test]
async fn test_concurrent_stage_calls_generate_unique_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(storage(&dir));

    let mut handles = Vec::new();
    for _ in 0..100 {
        let storage = storage.clone();
        handles.push(tokio::spawn(async move {
            storage
                .stage("img.jpg", Some("image/jpeg"), b"payload")
                .await
                .unwrap()
                .filename
        }));
    }

    let mut names = HashSet::new();
    for handle in handles {
        assert!(names.insert(handle.await.unwrap()));
    }
    assert_eq!(names.len(), 100);
    assert_eq!(temp_file_count(&dir), 100);
}
