//! Upload tree: `<root>/<division>/<state>/<KIND>/<file>`.

use crate::error::{StorageError, StorageResult};
use bytes::Bytes;
use futures::Stream;
use portal_core::access::DivisionScope;
use portal_core::clock::format_last_updated;
use portal_core::{DocumentKind, folder_name, secure_filename, upload_filename};
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use std::time::SystemTime;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;
use walkdir::WalkDir;

/// Default chunk size for streaming reads (64 KiB).
pub(crate) const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// A stream of bytes read from disk.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// Folder holding one document kind for one division/state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentFolder {
    pub division: String,
    pub state: String,
    pub kind: DocumentKind,
}

impl DocumentFolder {
    pub fn new(division: impl Into<String>, state: impl Into<String>, kind: DocumentKind) -> Self {
        Self {
            division: division.into(),
            state: state.into(),
            kind,
        }
    }

    fn segments(&self) -> [&str; 3] {
        [&self.division, &self.state, self.kind.as_str()]
    }
}

/// An opened stored file.
pub struct StoredFile {
    pub size: u64,
    pub stream: ByteStream,
}

/// A state folder and the newest modification time of anything beneath it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateListing {
    pub name: String,
    /// `YYYY-MM-DD HH:MM AM/PM`, empty when the folder holds no files.
    pub last_updated: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DivisionListing {
    pub name: String,
    pub states: Vec<StateListing>,
}

/// Sanitize a stored file name; a name that sanitizes to nothing is rejected.
fn file_segment(raw: &str) -> StorageResult<String> {
    let safe = secure_filename(raw);
    if safe.is_empty() {
        return Err(StorageError::InvalidKey(format!(
            "empty file name after sanitizing: {raw:?}"
        )));
    }
    Ok(safe)
}

/// Relative key for `folders`, optionally ending in a file name.
fn relative_key(folders: &[&str], file: Option<&str>) -> StorageResult<PathBuf> {
    let mut key: PathBuf = folders.iter().map(|raw| folder_name(raw)).collect();
    if let Some(file) = file {
        key.push(file_segment(file)?);
    }
    Ok(key)
}

/// Uploaded documents on the local filesystem.
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Open the upload tree, creating the root if needed.
    pub async fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve sanitized segments under the root, rejecting symlink escapes.
    async fn resolve(&self, folders: &[&str], file: Option<&str>) -> StorageResult<PathBuf> {
        let key = relative_key(folders, file)?;
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || Self::key_path_sync(&root, &key)).await?
    }

    /// Returns an error if `key` would escape the root, including through a
    /// symlinked file or ancestor directory.
    fn key_path_sync(root: &Path, key: &Path) -> StorageResult<PathBuf> {
        if key
            .components()
            .any(|component| !matches!(component, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(format!(
                "contains unsafe path component: {}",
                key.display()
            )));
        }

        let path = root.join(key);
        let root_canonical = root.canonicalize()?;

        // The path itself when it exists, otherwise its nearest existing ancestor.
        let mut ancestor = path.as_path();
        loop {
            match std::fs::symlink_metadata(ancestor) {
                Ok(meta) => {
                    let canonical = ancestor.canonicalize().map_err(|e| {
                        if meta.file_type().is_symlink() {
                            StorageError::InvalidKey(format!(
                                "symlink target missing or invalid: {}",
                                key.display()
                            ))
                        } else {
                            StorageError::Io(e)
                        }
                    })?;
                    if !canonical.starts_with(&root_canonical) {
                        return Err(StorageError::InvalidKey(format!(
                            "resolved path escapes upload root: {}",
                            key.display()
                        )));
                    }
                    return Ok(path);
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(StorageError::Io(err)),
            }
            match ancestor.parent() {
                Some(parent) => ancestor = parent,
                None => return Ok(path),
            }
        }
    }

    /// Store a stockist's document and return the derived filename.
    ///
    /// The name depends only on the stockist and the kind (plus the uploaded
    /// extension), so a re-upload replaces the previous file.
    #[instrument(skip(self, data), fields(kind = %folder.kind, size = data.len()))]
    pub async fn save(
        &self,
        folder: &DocumentFolder,
        stockist_name: &str,
        stockist_code: &str,
        original_filename: &str,
        data: Bytes,
    ) -> StorageResult<String> {
        let filename =
            upload_filename(stockist_name, stockist_code, folder.kind, original_filename);
        let [division, state, kind] = folder.segments();
        let path = self.resolve(&[division, state, kind], Some(&filename)).await?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_name = format!(".tmp.{}", Uuid::new_v4());
        let temp_path = path.with_file_name(format!("{filename}{temp_name}"));
        let result = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &path).await
        }
        .await;
        if let Err(err) = result {
            let _ = fs::remove_file(&temp_path).await;
            return Err(err.into());
        }

        tracing::info!(file = %filename, "stored upload");
        Ok(filename)
    }

    /// Remove a stored file. A file that is already gone is not an error.
    #[instrument(skip(self), fields(kind = %folder.kind))]
    pub async fn delete(&self, folder: &DocumentFolder, filename: &str) -> StorageResult<()> {
        let [division, state, kind] = folder.segments();
        let path = self.resolve(&[division, state, kind], Some(filename)).await?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(file = %filename, "stored file already absent");
                Ok(())
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Open a stored file for streaming.
    #[instrument(skip(self), fields(kind = %folder.kind))]
    pub async fn open(&self, folder: &DocumentFolder, filename: &str) -> StorageResult<StoredFile> {
        use tokio::io::AsyncReadExt;

        let [division, state, kind] = folder.segments();
        let path = self.resolve(&[division, state, kind], Some(filename)).await?;
        let not_found = || StorageError::NotFound(filename.to_string());

        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                not_found()
            } else {
                StorageError::Io(e)
            }
        })?;
        let meta = file.metadata().await?;
        if !meta.is_file() {
            return Err(not_found());
        }

        let stream = async_stream::try_stream! {
            let mut file = file;
            let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
            loop {
                let n = file.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                yield Bytes::copy_from_slice(&buf[..n]);
            }
        };

        Ok(StoredFile {
            size: meta.len(),
            stream: Box::pin(stream),
        })
    }

    /// Existing directory at `root/<segments...>`, or `None`.
    ///
    /// Used to pick the folder handed to the archive builder; an empty slice
    /// resolves to the root itself.
    pub async fn subtree(&self, segments: &[&str]) -> StorageResult<Option<PathBuf>> {
        let path = if segments.is_empty() {
            self.root.clone()
        } else {
            match self.resolve(segments, None).await {
                Ok(path) => path,
                Err(StorageError::InvalidKey(reason)) => {
                    tracing::warn!(%reason, "rejected archive folder");
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
        };
        match fs::symlink_metadata(&path).await {
            Ok(meta) if meta.is_dir() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Divisions visible under `scope`, each with its state folders.
    #[instrument(skip(self))]
    pub async fn division_tree(
        &self,
        scope: &DivisionScope,
    ) -> StorageResult<Vec<DivisionListing>> {
        let root = self.root.clone();
        let scope = scope.clone();
        tokio::task::spawn_blocking(move || division_tree_sync(&root, &scope)).await?
    }

    pub async fn health_check(&self) -> StorageResult<()> {
        let metadata = fs::metadata(&self.root).await.map_err(|e| {
            StorageError::Io(std::io::Error::new(
                e.kind(),
                format!("upload root not accessible: {e}"),
            ))
        })?;

        if !metadata.is_dir() {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                format!("upload root is not a directory: {:?}", self.root),
            )));
        }

        Ok(())
    }
}

/// Sorted names of real (non-symlink) subdirectories.
fn child_dirs(dir: &Path) -> StorageResult<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn newest_file(dir: &Path) -> StorageResult<Option<SystemTime>> {
    let mut newest = None;
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        newest = newest.max(Some(modified));
    }
    Ok(newest)
}

fn division_tree_sync(root: &Path, scope: &DivisionScope) -> StorageResult<Vec<DivisionListing>> {
    let mut divisions = Vec::new();
    for (name, path) in child_dirs(root)? {
        if !scope.permits_folder(&name) {
            continue;
        }
        let states = child_dirs(&path)?
            .into_iter()
            .map(|(state, state_path)| {
                let last_updated = newest_file(&state_path)?
                    .map(format_last_updated)
                    .unwrap_or_default();
                Ok(StateListing {
                    name: state,
                    last_updated,
                })
            })
            .collect::<StorageResult<Vec<_>>>()?;
        divisions.push(DivisionListing { name, states });
    }
    Ok(divisions)
}
