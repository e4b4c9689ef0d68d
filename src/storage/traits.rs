use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Somewhere a generated image can be kept after it is returned.
#[async_trait]
pub trait ImageSink: Send + Sync {
    /// Persists raw image bytes and returns where they went.
    async fn save(&self, bytes: &[u8]) -> Result<PathBuf>;
}
