//! The `fragment` module provides [`DataFragment`], a bounded copy of raw bytes taken
//! from a larger buffer. Fragments are the unit passed between the codecs of
//! [`crate::DataType`] and the byte store of [`crate::HexDocument`].

use crate::error::{HexerError, Result};

/// Maximum number of bytes a fragment can hold
pub const MAX_LENGTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFragment {
    /// Bit address of the first byte
    pub address: usize,
    /// Number of meaningful bytes in `data`
    length: usize,
    /// Fixed-capacity storage. Only the first `length` bytes are valid.
    data: [u8; MAX_LENGTH],
}

impl Default for DataFragment {
    fn default() -> Self {
        Self::empty(0)
    }
}

impl DataFragment {
    /// Creates a fragment with no valid bytes.
    ///
    /// # Example
    /// ```
    /// use hexerlib::DataFragment;
    ///
    /// let df = DataFragment::empty(0x80);
    /// assert!(df.is_empty());
    /// assert_eq!(df.address, 0x80);
    /// ```
    #[must_use]
    pub const fn empty(address: usize) -> Self {
        Self {
            address,
            length: 0,
            data: [0; MAX_LENGTH],
        }
    }

    /// Copies up to `requested` bytes from `source`, starting at byte `offset`.
    ///
    /// The resulting length is `min(requested, MAX_LENGTH, source.len() - offset)`
    /// and is 0 when `offset` lies past the end of `source`.
    ///
    /// # Errors
    /// Returns [`HexerError::InvalidArgument`] if `source` is `None`.
    ///
    /// # Example
    /// ```
    /// use hexerlib::DataFragment;
    ///
    /// let df = DataFragment::new(0, Some(&[1, 2, 3]), 1, 10).unwrap();
    /// assert_eq!(df.len(), 2);
    /// assert_eq!(df.bytes(), &[2, 3]);
    /// ```
    pub fn new(
        address: usize,
        source: Option<&[u8]>,
        offset: usize,
        requested: usize,
    ) -> Result<Self> {
        let source = source
            .ok_or_else(|| HexerError::InvalidArgument("fragment source buffer".into()))?;
        Ok(Self::from_slice(address, source, offset, requested))
    }

    /// Infallible variant of [`DataFragment::new`] for a source that is known to exist.
    #[must_use]
    pub fn from_slice(address: usize, source: &[u8], offset: usize, requested: usize) -> Self {
        let available = source.len().saturating_sub(offset);
        let length = requested.min(available).min(MAX_LENGTH);

        let mut fragment = Self::empty(address);
        if length > 0 {
            fragment.data[..length].copy_from_slice(&source[offset..offset + length]);
        }
        fragment.length = length;
        fragment
    }

    /// Creates a fragment holding the provided bytes (truncated to [`MAX_LENGTH`]).
    #[must_use]
    pub fn from_bytes(address: usize, bytes: &[u8]) -> Self {
        Self::from_slice(address, bytes, 0, bytes.len())
    }

    /// Valid bytes of the fragment
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.length]
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Byte offset into the backing buffer
    #[must_use]
    pub const fn byte_address(&self) -> usize {
        self.address / 8
    }
}
