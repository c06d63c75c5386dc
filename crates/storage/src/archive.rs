//! Zip archives of upload subtrees, staged in a scratch file.

use crate::error::{StorageError, StorageResult};
use crate::uploads::{ByteStream, STREAM_CHUNK_SIZE};
use bytes::Bytes;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::instrument;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A finished archive on disk, deleted when dropped.
#[derive(Debug)]
pub struct ScratchArchive {
    file: NamedTempFile,
    file_count: usize,
    size: u64,
}

impl ScratchArchive {
    /// Number of files stored in the archive.
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// Archive size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Stream the archive. The scratch file is removed once the stream finishes
    /// or is dropped, whether or not every byte was delivered.
    pub fn into_stream(self) -> ByteStream {
        use tokio::io::AsyncReadExt;

        let scratch = self.file;
        let stream = async_stream::try_stream! {
            let scratch = scratch;
            let mut file = tokio::fs::File::open(scratch.path()).await?;
            let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
            loop {
                let n = file.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                yield Bytes::copy_from_slice(&buf[..n]);
            }
            drop(file);
            tracing::debug!(path = %scratch.path().display(), "archive streamed");
        };
        Box::pin(stream)
    }
}

/// Zip every regular file under `subtree` into a scratch file in `scratch_dir`.
///
/// Entry names are paths relative to `upload_root` with forward slashes.
/// Symlinks are not followed.
pub async fn build_archive(
    upload_root: &Path,
    subtree: &Path,
    scratch_dir: &Path,
) -> StorageResult<ScratchArchive> {
    let upload_root = upload_root.to_path_buf();
    let subtree = subtree.to_path_buf();
    let scratch_dir = scratch_dir.to_path_buf();
    tokio::task::spawn_blocking(move || build_archive_sync(&upload_root, &subtree, &scratch_dir))
        .await?
}

#[instrument(skip_all, fields(subtree = %subtree.display()))]
fn build_archive_sync(
    upload_root: &Path,
    subtree: &Path,
    scratch_dir: &Path,
) -> StorageResult<ScratchArchive> {
    std::fs::create_dir_all(scratch_dir)?;
    let mut scratch = tempfile::Builder::new()
        .prefix("archive-")
        .suffix(".zip")
        .tempfile_in(scratch_dir)?;

    let options = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);
    let mut file_count = 0;
    {
        let mut writer = ZipWriter::new(scratch.as_file_mut());
        for entry in WalkDir::new(subtree).follow_links(false).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry_name(upload_root, entry.path())?;
            writer.start_file(name, options)?;
            let mut source = std::fs::File::open(entry.path())?;
            std::io::copy(&mut source, &mut writer)?;
            file_count += 1;
        }
        writer.finish()?.flush()?;
    }

    let size = scratch.as_file().metadata()?.len();
    tracing::info!(files = file_count, bytes = size, "archive built");
    Ok(ScratchArchive {
        file: scratch,
        file_count,
        size,
    })
}

fn entry_name(upload_root: &Path, path: &Path) -> StorageResult<String> {
    let relative = path.strip_prefix(upload_root).map_err(|_| {
        StorageError::InvalidKey(format!(
            "{} is outside {}",
            path.display(),
            upload_root.display()
        ))
    })?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}
