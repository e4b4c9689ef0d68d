use crate::{error::Result, storage::traits::ImageSink};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Writes images as `generated_image_<timestamp>.png` under a directory.
pub struct DiskImageSink {
    dir: PathBuf,
}

impl DiskImageSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_path(&self) -> PathBuf {
        let now = chrono::Utc::now();
        let short_id = uuid::Uuid::new_v4().simple().to_string();
        self.dir.join(format!(
            "generated_image_{}_{}.png",
            now.format("%Y%m%d%H%M%S%3f"),
            &short_id[..8]
        ))
    }
}

#[async_trait]
impl ImageSink for DiskImageSink {
    async fn save(&self, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.next_path();
        tokio::fs::write(&path, bytes).await?;
        log::info!("💾 Image saved to: {}", path.display());
        Ok(path)
    }
}
