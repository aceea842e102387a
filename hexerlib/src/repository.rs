//! The `repository` module provides [`MarkerRepository`], the address-sorted index of
//! [`DataMarker`]s of one workbench session.
//!
//! Markers are keyed by their bit address in a `BTreeMap`. Besides exact lookups the
//! repository answers covering queries (which marker spans a given address) with a
//! predecessor search over the sorted start addresses, so marker spans are not
//! bounded in size.
//!
//! Markers are persisted as a JSON list of `{typeName, address, numBytes, note}`
//! records. Loading replaces the current markers and is atomic: the whole file is
//! parsed and validated before anything in memory changes.

use crate::datatype::DataType;
use crate::error::{HexerError, Result};
use crate::fragment::MAX_LENGTH;
use crate::interval::Interval;
use crate::marker::{DataMarker, MarkerRecord, span_end};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct MarkerRepository {
    /// Markers keyed by bit address
    markers: BTreeMap<usize, DataMarker>,
    /// Marker file used by the last save or load
    filepath: Option<PathBuf>,
}

impl<'a> IntoIterator for &'a MarkerRepository {
    type Item = &'a DataMarker;
    type IntoIter = std::collections::btree_map::Values<'a, usize, DataMarker>;
    fn into_iter(self) -> Self::IntoIter {
        self.markers.values()
    }
}

impl MarkerRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a marker with the type's default width and note "Unnamed".
    ///
    /// # Errors
    /// - [`HexerError::DuplicateKey`] if a marker already starts at `address`
    /// - [`HexerError::InvalidArgument`] if the span would end past `usize::MAX`
    ///
    /// # Example
    /// ```
    /// use hexerlib::{DataType, MarkerRepository};
    ///
    /// let mut repo = MarkerRepository::new();
    /// let int32 = DataType::from_name("int32").unwrap();
    /// repo.add_marker(80, int32).unwrap();
    ///
    /// assert!(repo.add_marker(80, int32).is_err());
    /// assert_eq!(repo.get_marker_covering(88).map(|m| m.address), Some(80));
    /// ```
    pub fn add_marker(&mut self, address: usize, data_type: DataType) -> Result<&DataMarker> {
        span_end(address, data_type.num_bytes())?;
        match self.markers.entry(address) {
            Entry::Occupied(_) => Err(HexerError::DuplicateKey(address)),
            Entry::Vacant(slot) => {
                debug!(address, data_type = data_type.name(), "marker added");
                Ok(slot.insert(DataMarker::new(address, data_type)))
            }
        }
    }

    /// Removes the marker starting at `address` and returns it.
    ///
    /// # Errors
    /// Returns [`HexerError::NotFound`] if no marker starts at `address`.
    pub fn remove_marker(&mut self, address: usize) -> Result<DataMarker> {
        let removed = self
            .markers
            .remove(&address)
            .ok_or(HexerError::NotFound(address))?;
        debug!(address, "marker removed");
        Ok(removed)
    }

    /// Replaces the stored marker with an edited copy.
    ///
    /// # Errors
    /// - [`HexerError::NotFound`] if no marker starts at `marker.address`
    /// - [`HexerError::InvalidArgument`] if the width is 0, exceeds [`MAX_LENGTH`]
    ///   or does not match a fixed-width type, or if the span would end past `usize::MAX`
    ///
    /// # Example
    /// ```
    /// use hexerlib::{DataType, MarkerRepository};
    ///
    /// let mut repo = MarkerRepository::new();
    /// repo.add_marker(0, DataType::from_name("ascii").unwrap()).unwrap();
    ///
    /// let mut edited = repo.get_marker(0).cloned().unwrap();
    /// edited.note = "magic".into();
    /// edited.num_bytes = 4;
    /// repo.update_marker(edited).unwrap();
    ///
    /// assert_eq!(repo.get_marker(0).unwrap().num_bytes, 4);
    /// ```
    pub fn update_marker(&mut self, mut marker: DataMarker) -> Result<()> {
        if !self.markers.contains_key(&marker.address) {
            return Err(HexerError::NotFound(marker.address));
        }
        if marker.num_bytes == 0 || marker.num_bytes > MAX_LENGTH {
            return Err(HexerError::InvalidArgument(format!(
                "marker width must be within 1..={MAX_LENGTH}, got {}",
                marker.num_bytes
            )));
        }
        span_end(marker.address, marker.num_bytes)?;
        marker.data_type = marker.sized_type()?;

        debug!(address = marker.address, data_type = marker.data_type.name(), "marker updated");
        self.markers.insert(marker.address, marker);
        Ok(())
    }

    /// Exact lookup of the marker starting at `address`
    #[must_use]
    pub fn get_marker(&self, address: usize) -> Option<&DataMarker> {
        self.markers.get(&address)
    }

    #[must_use]
    pub fn is_marker(&self, address: usize) -> bool {
        self.markers.contains_key(&address)
    }

    /// Find the marker whose span `[address, address + num_bytes * 8)` contains the
    /// provided bit address, even if it is not the marker's start.
    ///
    /// Only the closest marker starting at or before `address` is considered.
    #[must_use]
    pub fn get_marker_covering(&self, address: usize) -> Option<&DataMarker> {
        self.markers
            .range(..=address)
            .next_back()
            .map(|(_, marker)| marker)
            .filter(|marker| marker.covers(address))
    }

    /// Markers starting inside the closed interval of bit addresses, in ascending order
    pub fn markers_in(&self, range: Interval<usize>) -> impl Iterator<Item = &DataMarker> {
        let bounds = range.is_valid().then_some(range.min..=range.max);
        bounds
            .into_iter()
            .flat_map(move |bounds| self.markers.range(bounds).map(|(_, marker)| marker))
    }

    /// All markers in ascending address order
    pub fn markers(&self) -> impl Iterator<Item = &DataMarker> {
        self.markers.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Removes all markers. The remembered file path is kept.
    pub fn clear(&mut self) {
        self.markers.clear();
    }

    #[must_use]
    pub fn has_file_name(&self) -> bool {
        self.filepath.is_some()
    }

    #[must_use]
    pub fn filepath(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    /// Writes all markers to `filepath` (or to the remembered path when `None`),
    /// overwriting the file. The path is remembered for later saves.
    ///
    /// # Errors
    /// - [`HexerError::InvalidArgument`] if no path is given and none is remembered
    /// - [`HexerError::Io`] if the file cannot be written
    pub fn save_to_file(&mut self, filepath: Option<&Path>) -> Result<()> {
        let path = match filepath {
            Some(p) => p.to_path_buf(),
            None => self
                .filepath
                .clone()
                .ok_or_else(|| HexerError::InvalidArgument("no marker file name".into()))?,
        };

        // Ensure the parent directory exists
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| HexerError::io(parent, e))?;
        }

        let file = std::fs::File::create(&path).map_err(|e| HexerError::io(&path, e))?;
        let mut writer = BufWriter::new(file);

        let records: Vec<MarkerRecord> = self.markers.values().map(MarkerRecord::from).collect();
        serde_json::to_writer_pretty(&mut writer, &records)?;
        writer.flush().map_err(|e| HexerError::io(&path, e))?;

        info!(path = %path.display(), count = records.len(), "markers saved");
        self.filepath = Some(path);
        Ok(())
    }

    /// Replaces the markers with the content of a marker file.
    ///
    /// The file is parsed completely first; on any error the repository is left
    /// unchanged.
    ///
    /// # Errors
    /// - [`HexerError::Io`] if the file cannot be read
    /// - [`HexerError::MarkerFormat`] if the content is not a marker list
    /// - [`HexerError::UnknownType`] / [`HexerError::InvalidArgument`] for bad records
    /// - [`HexerError::DuplicateKey`] if two records share an address
    pub fn load_from_file<P: AsRef<Path>>(&mut self, filepath: P) -> Result<()> {
        let path = filepath.as_ref();
        let file = std::fs::File::open(path).map_err(|e| HexerError::io(path, e))?;
        let records: Vec<MarkerRecord> = serde_json::from_reader(BufReader::new(file))?;

        let mut loaded = BTreeMap::new();
        for record in records {
            let marker = record.into_marker()?;
            let address = marker.address;
            if loaded.insert(address, marker).is_some() {
                return Err(HexerError::DuplicateKey(address));
            }
        }

        info!(path = %path.display(), count = loaded.len(), "markers loaded");
        self.markers = loaded;
        self.filepath = Some(path.to_path_buf());
        Ok(())
    }
}
