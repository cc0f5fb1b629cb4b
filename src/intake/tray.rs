//! The intake tray: ordered selected files, preview handles, and encoding.

use crate::error::{PixsynthError, Result};
use crate::intake::media::declared_mime_type;
use base64::Engine;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Opaque handle to a locally minted preview resource.
///
/// Handles are minted by the tray when a file is added and released when the
/// entry is removed, the tray is cleared, or the tray is dropped. A handle
/// never outlives its entry.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PreviewHandle(u64);

impl PreviewHandle {
    /// Returns the numeric id of this preview, for display-layer lookup.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Process-local registry of live preview resources.
#[derive(Debug, Default)]
struct PreviewStore {
    next_id: u64,
    active: HashSet<u64>,
}

impl PreviewStore {
    fn mint(&mut self) -> PreviewHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.active.insert(id);
        PreviewHandle(id)
    }

    fn release(&mut self, handle: &PreviewHandle) {
        let was_active = self.active.remove(&handle.0);
        debug_assert!(was_active, "preview {} released twice", handle.0);
    }

    fn active(&self) -> usize {
        self.active.len()
    }
}

/// One selected file together with its live preview handle.
#[derive(Debug)]
pub struct ImageEntry {
    path: PathBuf,
    preview: PreviewHandle,
}

impl ImageEntry {
    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The entry's preview handle.
    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }
}

/// A file's content re-encoded for transport: base64 payload plus the
/// declared media type. Derived transiently at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Declared MIME type, e.g. `image/png`.
    pub media_type: String,
    /// Base64 payload (standard alphabet, no data-URL prefix).
    pub data: String,
}

/// Ordered collection of selected images.
///
/// Entries and preview handles are 1:1: every add mints a preview, and every
/// removal path (remove, clear, drop) releases it exactly once.
#[derive(Debug, Default)]
pub struct ImageTray {
    entries: Vec<ImageEntry>,
    previews: PreviewStore,
}

impl ImageTray {
    /// Creates an empty tray.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends entries for the given files, preserving selection order.
    ///
    /// No file content is read here; content IO happens at encode time.
    pub fn add<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for path in paths {
            let preview = self.previews.mint();
            self.entries.push(ImageEntry {
                path: path.into(),
                preview,
            });
        }
        tracing::debug!(count = self.entries.len(), "intake updated");
    }

    /// Releases the preview at `index` and removes the entry. Later entries
    /// shift down by one.
    pub fn remove(&mut self, index: usize) -> Result<()> {
        if index >= self.entries.len() {
            return Err(PixsynthError::Validation(format!(
                "no image at index {index}"
            )));
        }
        let entry = self.entries.remove(index);
        self.previews.release(&entry.preview);
        Ok(())
    }

    /// Releases every preview and empties the collection.
    pub fn clear(&mut self) {
        for entry in self.entries.drain(..) {
            self.previews.release(&entry.preview);
        }
    }

    /// The entries in selection order.
    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    /// Number of selected images.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no images are selected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of preview resources currently live.
    pub fn active_previews(&self) -> usize {
        self.previews.active()
    }

    /// Reads and encodes the entry at `index`.
    pub async fn encode(&self, index: usize) -> Result<EncodedImage> {
        let entry = self.entries.get(index).ok_or_else(|| {
            PixsynthError::Validation(format!("no image at index {index}"))
        })?;
        encode_file(&entry.path).await
    }

    /// Encodes every entry, issuing all reads concurrently and awaiting them
    /// jointly. One failing read fails the whole batch.
    pub async fn encode_all(&self) -> Result<Vec<EncodedImage>> {
        futures::future::try_join_all(self.entries.iter().map(|e| encode_file(&e.path))).await
    }
}

impl Drop for ImageTray {
    fn drop(&mut self) {
        self.clear();
    }
}

async fn encode_file(path: &Path) -> Result<EncodedImage> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| PixsynthError::Encoding {
            path: path.to_path_buf(),
            source,
        })?;

    let media_type = declared_mime_type(path, &bytes).to_string();
    let data = base64::engine::general_purpose::STANDARD.encode(&bytes);

    Ok(EncodedImage { media_type, data })
}
