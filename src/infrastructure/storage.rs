use crate::config::AppConfig;
use crate::services::uploads::UploadStorage;
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &AppConfig) -> anyhow::Result<Arc<UploadStorage>> {
    let storage = UploadStorage::new(
        config.temp_upload_dir(),
        config.permanent_upload_dir(),
        config.max_upload_size,
    );

    storage.ensure_dirs().await?;

    info!(
        "🗂️  Upload storage ready: temp={:?}, permanent={:?}",
        storage.temp_dir(),
        storage.permanent_dir()
    );

    Ok(Arc::new(storage))
}
