use crate::error::{HexerError, Result};
use crate::fragment::{DataFragment, MAX_LENGTH};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Raw bytes of a file held in memory, with tracking of edited bytes.
#[derive(Debug, Clone, Default)]
pub struct HexDocument {
    bytes: Vec<u8>,
    filepath: Option<PathBuf>,
    /// Tracks the modified bytes by storing byte indices and original values before modification
    modified: HashMap<usize, u8>,
}

impl HexDocument {
    /// Wraps an in-memory buffer. The document has no file name until saved.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            ..Self::default()
        }
    }

    /// Reads the whole file into memory.
    ///
    /// # Errors
    /// Returns [`HexerError::Io`] if the file cannot be read.
    pub fn load<P: AsRef<Path>>(filepath: P) -> Result<Self> {
        let path = filepath.as_ref();
        let bytes = std::fs::read(path).map_err(|e| HexerError::io(path, e))?;

        info!(path = %path.display(), size = bytes.len(), "document loaded");
        Ok(Self {
            bytes,
            filepath: Some(path.to_path_buf()),
            modified: HashMap::new(),
        })
    }

    /// Writes the bytes to `filepath` (or back to the file it was loaded from when
    /// `None`). After a successful write the edits count as saved.
    ///
    /// # Errors
    /// - [`HexerError::InvalidArgument`] if no path is given and the document has none
    /// - [`HexerError::Io`] if the file cannot be written
    pub fn save(&mut self, filepath: Option<&Path>) -> Result<()> {
        let path = match filepath {
            Some(p) => p.to_path_buf(),
            None => self
                .filepath
                .clone()
                .ok_or_else(|| HexerError::InvalidArgument("no document file name".into()))?,
        };

        // Ensure the parent directory exists
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| HexerError::io(parent, e))?;
        }

        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| HexerError::io(&path, e))?;

        let mut writer = std::io::BufWriter::new(file);
        writer.write_all(&self.bytes).map_err(|e| HexerError::io(&path, e))?;
        writer.flush().map_err(|e| HexerError::io(&path, e))?;

        info!(path = %path.display(), size = self.bytes.len(), "document saved");
        self.modified.clear();
        self.filepath = Some(path);
        Ok(())
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn filepath(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    /// File name for display, `"Untitled"` for documents without a file
    #[must_use]
    pub fn name(&self) -> String {
        self.filepath
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| "Untitled".to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Up to [`MAX_LENGTH`] bytes starting at the bit address. The fragment is empty
    /// when the address lies past the end of the document.
    #[must_use]
    pub fn fragment_at(&self, address: usize) -> DataFragment {
        DataFragment::from_slice(address, &self.bytes, address / 8, MAX_LENGTH)
    }

    /// Copies the fragment bytes into the document at the fragment's address.
    /// An empty fragment is a no-op.
    ///
    /// # Errors
    /// Returns [`HexerError::InvalidArgument`] if the fragment does not lie
    /// completely within the document. Nothing is written in that case.
    pub fn apply_edit(&mut self, fragment: &DataFragment) -> Result<()> {
        if fragment.is_empty() {
            return Ok(());
        }

        let start = fragment.byte_address();
        let end = start + fragment.len();
        if end > self.bytes.len() {
            return Err(HexerError::InvalidArgument(format!(
                "edit of {} bytes at byte {start} exceeds document size {}",
                fragment.len(),
                self.bytes.len()
            )));
        }

        for (idx, &new) in (start..end).zip(fragment.bytes()) {
            let old = self.bytes[idx];
            if old != new {
                // Keep the value from before the first modification only
                self.modified.entry(idx).or_insert(old);
                self.bytes[idx] = new;
            }
        }

        debug!(byte = start, len = fragment.len(), "edit applied");
        Ok(())
    }

    /// Check if the byte at the byte index differs from the loaded/saved content
    #[must_use]
    pub fn is_modified(&self, byte_index: usize) -> bool {
        self.modified
            .get(&byte_index)
            .is_some_and(|orig| self.bytes.get(byte_index) != Some(orig))
    }

    /// Number of bytes that differ from the loaded/saved content
    #[must_use]
    pub fn modified_count(&self) -> usize {
        self.modified
            .iter()
            .filter(|&(&idx, orig)| self.bytes.get(idx) != Some(orig))
            .count()
    }

    /// Revert all edits since load or last save
    pub fn restore(&mut self) {
        for (&idx, &orig) in &self.modified {
            if let Some(byte) = self.bytes.get_mut(idx) {
                *byte = orig;
            }
        }
        debug!(count = self.modified.len(), "edits restored");
        self.modified.clear();
    }
}
