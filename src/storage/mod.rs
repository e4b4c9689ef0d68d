pub mod disk;
pub mod traits;

pub use disk::DiskImageSink;
pub use traits::ImageSink;

use crate::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::PathBuf;

/// Decodes a base64 image payload and hands it to the sink.
pub async fn save_base64(sink: &dyn ImageSink, data: &str) -> Result<PathBuf> {
    let bytes = STANDARD.decode(data.trim())?;
    sink.save(&bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;

    #[tokio::test]
    async fn test_save_base64_decodes_before_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DiskImageSink::new(tmp.path());

        let path = save_base64(&sink, "aGVsbG8=").await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_invalid_base64_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DiskImageSink::new(tmp.path());

        let err = save_base64(&sink, "not base64!!").await.unwrap_err();
        assert!(matches!(err, RelayError::Base64Error(_)));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
