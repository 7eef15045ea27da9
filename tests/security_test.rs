use furniture_backend::api::error::AppError;
use furniture_backend::services::uploads::UploadStorage;
use tempfile::TempDir;

fn storage(dir: &TempDir) -> UploadStorage {
    UploadStorage::new(
        dir.path().join("temp-uploads"),
        dir.path().join("uploads"),
        10 * 1024 * 1024,
    )
}

#[tokio::test]
async fn test_cleanup_never_escapes_the_temp_area() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir);
    storage.ensure_dirs().await.unwrap();

    // A file that lives outside the temp area must be unreachable
    let outside = dir.path().join("secret.txt");
    std::fs::write(&outside, b"do not delete").unwrap();

    let results = storage
        .cleanup(&[
            "../secret.txt".to_string(),
            "/temp-uploads/../secret.txt".to_string(),
            "..".to_string(),
            "/temp-uploads/..".to_string(),
        ])
        .await;

    assert_eq!(results.len(), 4);
    // Traversal inputs either collapse to a missing temp file or are
    // rejected outright; none of them may touch the real target.
    assert!(results.iter().all(|outcome| !outcome.success));
    assert!(outside.exists());
}

#[tokio::test]
async fn test_cleanup_only_deletes_inside_temp_dir() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir);
    storage.ensure_dirs().await.unwrap();

    // Same filename in both areas: cleanup must only touch the temp copy
    std::fs::write(dir.path().join("temp-uploads").join("a.jpg"), b"temp").unwrap();
    std::fs::write(dir.path().join("uploads").join("a.jpg"), b"permanent").unwrap();

    let results = storage.cleanup(&["/uploads/a.jpg".to_string()]).await;

    assert!(results[0].success);
    assert!(!dir.path().join("temp-uploads").join("a.jpg").exists());
    assert!(dir.path().join("uploads").join("a.jpg").exists());
}

#[tokio::test]
async fn test_promote_never_reads_outside_the_temp_area() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir);
    storage.ensure_dirs().await.unwrap();

    let outside = dir.path().join("secret.txt");
    std::fs::write(&outside, b"do not publish").unwrap();

    // The trailing segment resolves inside the temp dir, where no such
    // file exists
    let err = storage.promote("../secret.txt").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = storage
        .promote("/temp-uploads/../../secret.txt")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Bare traversal segments are rejected before touching the filesystem
    let err = storage.promote("/temp-uploads/..").await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    assert!(outside.exists());
    assert_eq!(
        std::fs::read_dir(dir.path().join("uploads")).unwrap().count(),
        0
    );
}

#[tokio::test]
async fn test_stage_rejects_executable_content() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir);

    // ELF header declared as an image
    let elf = [0x7F, 0x45, 0x4C, 0x46, 0x02, 0x01, 0x01, 0x00, 0, 0, 0, 0];
    let err = storage
        .stage("totally-a-photo.png", Some("image/png"), &elf)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnsupportedMediaType(_)));
}
