use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::extract::{ExtractionError, ImageError};
use crate::filename::{allocate, sidecar_path};
use crate::models::DownloadResult;

/// Paths written for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persisted {
    pub path: PathBuf,
    pub caption_path: PathBuf,
    pub bytes: usize,
}

/// Create the destination directory and its parents. Succeeds when it
/// already exists.
pub async fn ensure_directory(directory: &Path) -> Result<(), ExtractionError> {
    tokio::fs::create_dir_all(directory)
        .await
        .map_err(|source| ExtractionError::Storage {
            path: directory.to_path_buf(),
            source,
        })
}

/// Claim a free name in `directory`, write the image bytes there and the
/// caption next to it.
///
/// The name is allocated only now, after the download finished, so a failed
/// download never uses one up. Both files are created exclusively, so a file
/// that appeared after allocation makes the write fail rather than be
/// replaced. If the caption cannot be written the image is removed again.
pub async fn save_image(
    directory: &Path,
    desired_name: &str,
    bytes: Vec<u8>,
    caption: &str,
) -> Result<Persisted, ImageError> {
    let download = DownloadResult {
        path: allocate(directory, desired_name),
        bytes,
    };
    write_image_and_caption(download, caption).await
}

async fn write_image_and_caption(
    download: DownloadResult,
    caption: &str,
) -> Result<Persisted, ImageError> {
    write_new(&download.path, &download.bytes)
        .await
        .map_err(|source| ImageError::Persist {
            path: download.path.clone(),
            source,
        })?;

    let caption_path = sidecar_path(&download.path);
    if let Err(source) = write_new(&caption_path, caption.as_bytes()).await {
        if let Err(e) = tokio::fs::remove_file(&download.path).await {
            warn!(path = %download.path.display(), error = %e, "could not remove image after caption write failed");
        }
        return Err(ImageError::Persist {
            path: caption_path,
            source,
        });
    }

    Ok(Persisted {
        path: download.path,
        caption_path,
        bytes: download.bytes.len(),
    })
}

async fn write_new(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(contents).await?;
    file.flush().await
}
