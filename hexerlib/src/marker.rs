use crate::datatype::DataType;
use crate::error::{HexerError, Result};
use crate::interval::Interval;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Note given to freshly created markers
pub const DEFAULT_NOTE: &str = "Unnamed";

/// Annotation binding a byte span starting at a bit address to a typed
/// interpretation and a free-text note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMarker {
    /// Bit address of the first byte
    pub address: usize,
    /// Interpretation of the bytes
    pub data_type: DataType,
    /// Number of bytes covered. Differs from the type's default only for
    /// variable-width types.
    pub num_bytes: usize,
    pub note: String,
}

impl DataMarker {
    #[must_use]
    pub fn new(address: usize, data_type: DataType) -> Self {
        Self {
            address,
            data_type,
            num_bytes: data_type.num_bytes(),
            note: DEFAULT_NOTE.to_string(),
        }
    }

    /// Change the interpretation. Resets the width to the new type's width.
    pub fn set_type(&mut self, data_type: DataType) {
        self.data_type = data_type;
        self.num_bytes = data_type.num_bytes();
    }

    /// Type instance sized to this marker's span
    ///
    /// # Errors
    /// Returns an error if `num_bytes` is not a valid width for the type.
    pub fn sized_type(&self) -> Result<DataType> {
        self.data_type.with_num_bytes(self.num_bytes)
    }

    /// One past the last covered bit address, saturating at `usize::MAX`
    #[must_use]
    pub const fn end_address(&self) -> usize {
        self.address.saturating_add(self.num_bytes.saturating_mul(8))
    }

    /// Check if the bit address lies within `[address, address + num_bytes * 8)`
    #[must_use]
    pub const fn covers(&self, address: usize) -> bool {
        self.address <= address && address < self.end_address()
    }

    /// Covered bit addresses as a closed interval (`None` for an empty span)
    #[must_use]
    pub fn span(&self) -> Option<Interval<usize>> {
        (self.num_bytes > 0).then(|| Interval::new(self.address, self.end_address() - 1))
    }
}

/// End of the span `[address, address + num_bytes * 8)`.
///
/// # Errors
/// Returns [`HexerError::InvalidArgument`] if the end does not fit in a `usize`.
pub(crate) fn span_end(address: usize, num_bytes: usize) -> Result<usize> {
    num_bytes
        .checked_mul(8)
        .and_then(|bits| address.checked_add(bits))
        .ok_or_else(|| {
            HexerError::InvalidArgument(format!(
                "marker at {address:#x} with {num_bytes} bytes runs past the address space"
            ))
        })
}

impl PartialOrd for DataMarker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DataMarker {
    fn cmp(&self, other: &Self) -> Ordering {
        // Address first; the rest only keeps Ord consistent with Eq
        self.address
            .cmp(&other.address)
            .then_with(|| self.num_bytes.cmp(&other.num_bytes))
            .then_with(|| self.data_type.name().cmp(other.data_type.name()))
            .then_with(|| self.note.cmp(&other.note))
    }
}

/// On-disk shape of a marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MarkerRecord {
    pub type_name: String,
    pub address: usize,
    pub num_bytes: usize,
    pub note: String,
}

impl From<&DataMarker> for MarkerRecord {
    fn from(marker: &DataMarker) -> Self {
        Self {
            type_name: marker.data_type.name().to_string(),
            address: marker.address,
            num_bytes: marker.num_bytes,
            note: marker.note.clone(),
        }
    }
}

impl MarkerRecord {
    /// Resolve the type name and validate the width.
    pub(crate) fn into_marker(self) -> Result<DataMarker> {
        let data_type = DataType::from_name(&self.type_name)?.with_num_bytes(self.num_bytes)?;
        span_end(self.address, self.num_bytes)?;
        Ok(DataMarker {
            address: self.address,
            data_type,
            num_bytes: self.num_bytes,
            note: self.note,
        })
    }
}
