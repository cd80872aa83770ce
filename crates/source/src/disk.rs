//! Local directory source, mainly for development and tests.

use crate::Source;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use image::DynamicImage;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source that serves every decodable image file in one directory.
///
/// Files are enumerated once at construction and served in filename order
/// (directory enumeration order is platform-dependent; sorting keeps runs
/// reproducible). The image id is the file name. An empty directory fails
/// construction with [`Exhausted`](ErrorKind::Exhausted), since a source
/// must hold a valid first image once handed out.
#[derive(Debug)]
pub struct DiskSource {
    pending: VecDeque<PathBuf>,
    current: (String, DynamicImage),
}

impl DiskSource {
    /// Enumerate `dir` and load the first image.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut entries = tokio::fs::read_dir(dir).await.map_err(ErrorKind::Io)?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(ErrorKind::Io)? {
            if entry.file_type().await.map_err(ErrorKind::Io)?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        debug!(directory = %dir.display(), files = files.len(), "enumerated image directory");

        let mut source = Self {
            pending: files.into(),
            current: (String::new(), DynamicImage::new_rgb8(0, 0)),
        };
        source.current = source.load_next_file().await?;
        Ok(source)
    }

    async fn load_next_file(&mut self) -> Result<(String, DynamicImage)> {
        let Some(path) = self.pending.pop_front() else {
            exn::bail!(ErrorKind::Exhausted);
        };
        let id = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
        let bytes = tokio::fs::read(&path).await.map_err(ErrorKind::Io)?;
        let image = image::load_from_memory(&bytes).or_raise(|| ErrorKind::Decode(id.clone()))?;
        Ok((id, image))
    }
}

#[async_trait]
impl Source for DiskSource {
    async fn next(&mut self) -> Result<()> {
        self.current = self.load_next_file().await?;
        Ok(())
    }

    fn current_id(&self) -> &str {
        &self.current.0
    }

    fn current_content(&self) -> DynamicImage {
        self.current.1.clone()
    }

    async fn shutdown(&mut self) {
        self.pending.clear();
    }
}
