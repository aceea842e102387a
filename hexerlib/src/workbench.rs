//! The `workbench` module ties the pieces of a hex editing session together.
//!
//! A [`Workbench`] owns one [`HexDocument`], one [`MarkerRepository`] and one
//! [`Viewport`]. Front ends (the `hexcli` binary, a GUI shell) only talk to the
//! workbench: it resolves data type names, forwards decode/encode calls to the
//! codecs, annotation calls to the repository and screen math to the viewport.
//!
//! All addresses are bit addresses (`byte_index * 8`).

use crate::config::WorkbenchConfig;
use crate::datatype::{DataType, known_data_types};
use crate::document::HexDocument;
use crate::error::{HexerError, Result};
use crate::fragment::DataFragment;
use crate::marker::DataMarker;
use crate::repository::MarkerRepository;
use crate::search::{SearchType, find_first_occurrence, find_next_occurrence, search};
use crate::viewport::Viewport;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Workbench {
    config: WorkbenchConfig,
    document: Option<HexDocument>,
    markers: MarkerRepository,
    viewport: Viewport,
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new(WorkbenchConfig::default())
    }
}

impl Workbench {
    #[must_use]
    pub fn new(config: WorkbenchConfig) -> Self {
        let viewport = Viewport::new(&config);
        Self {
            config,
            document: None,
            markers: MarkerRepository::new(),
            viewport,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    #[must_use]
    pub const fn document(&self) -> Option<&HexDocument> {
        self.document.as_ref()
    }

    #[must_use]
    pub const fn markers(&self) -> &MarkerRepository {
        &self.markers
    }

    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Mutable access for scrolling and resizing
    pub const fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    fn doc(&self) -> Result<&HexDocument> {
        self.document.as_ref().ok_or(HexerError::NoDocument)
    }

    // ------------------------------------------------------------------
    // Document
    // ------------------------------------------------------------------

    /// Open a binary file. Markers of a previous document are dropped.
    ///
    /// # Errors
    /// Returns [`HexerError::Io`] if the file cannot be read. The current
    /// document stays open in that case.
    pub fn open_file<P: AsRef<Path>>(&mut self, filepath: P) -> Result<()> {
        let document = HexDocument::load(filepath)?;
        self.set_document(document);
        Ok(())
    }

    /// Open an in-memory buffer as the document
    pub fn open_bytes(&mut self, bytes: Vec<u8>) {
        self.set_document(HexDocument::from_bytes(bytes));
    }

    fn set_document(&mut self, document: HexDocument) {
        self.viewport.set_document_len(document.len());
        self.markers = MarkerRepository::new();
        self.document = Some(document);
    }

    /// Write the document to `filepath`, or back to its own file when `None`.
    ///
    /// # Errors
    /// - [`HexerError::NoDocument`] if no document is open
    /// - errors of [`HexDocument::save`]
    pub fn save_file(&mut self, filepath: Option<&Path>) -> Result<()> {
        self.document
            .as_mut()
            .ok_or(HexerError::NoDocument)?
            .save(filepath)
    }

    /// Up to [`crate::MAX_LENGTH`] bytes at the bit address (empty past the end).
    ///
    /// # Errors
    /// Returns [`HexerError::NoDocument`] if no document is open.
    pub fn fragment_at(&self, address: usize) -> Result<DataFragment> {
        Ok(self.doc()?.fragment_at(address))
    }

    #[must_use]
    pub fn selected_fragment(&self) -> Option<DataFragment> {
        let address = self.viewport.selected_address?;
        self.fragment_at(address).ok()
    }

    #[must_use]
    pub fn hover_fragment(&self) -> Option<DataFragment> {
        let address = self.viewport.hover_address?;
        self.fragment_at(address).ok()
    }

    /// Write the fragment into the document and move the selection to it.
    ///
    /// # Errors
    /// - [`HexerError::NoDocument`] if no document is open
    /// - [`HexerError::InvalidArgument`] if the fragment exceeds the document
    pub fn apply_edit(&mut self, fragment: &DataFragment) -> Result<()> {
        let document = self.document.as_mut().ok_or(HexerError::NoDocument)?;
        document.apply_edit(fragment)?;
        if !fragment.is_empty() {
            self.navigate_to(fragment.address)?;
        }
        Ok(())
    }

    /// Revert all edits since the document was opened or saved.
    ///
    /// # Errors
    /// Returns [`HexerError::NoDocument`] if no document is open.
    pub fn restore(&mut self) -> Result<()> {
        self.document
            .as_mut()
            .ok_or(HexerError::NoDocument)?
            .restore();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Codecs
    // ------------------------------------------------------------------

    /// # Errors
    /// Returns [`HexerError::UnknownType`] if the type name is not registered.
    pub fn decode(&self, type_name: &str, fragment: &DataFragment) -> Result<String> {
        Ok(DataType::from_name(type_name)?.decode_to_string(fragment))
    }

    /// # Errors
    /// - [`HexerError::UnknownType`] if the type name is not registered
    /// - [`HexerError::Parse`] if the text cannot be encoded
    pub fn encode(&self, type_name: &str, address: usize, text: &str) -> Result<DataFragment> {
        DataType::from_name(type_name)?.encode_string(address, text)
    }

    /// Decode the bytes at the bit address with every registered type
    ///
    /// # Errors
    /// Returns [`HexerError::NoDocument`] if no document is open.
    pub fn inspect(&self, address: usize) -> Result<Vec<(DataType, String)>> {
        let fragment = self.fragment_at(address)?;
        Ok(known_data_types()
            .map(|dt| (dt, dt.decode_to_string(&fragment)))
            .collect())
    }

    // ------------------------------------------------------------------
    // Markers
    // ------------------------------------------------------------------

    #[must_use]
    pub fn lookup_marker(&self, address: usize) -> Option<&DataMarker> {
        self.markers.get_marker(address)
    }

    #[must_use]
    pub fn lookup_covering_marker(&self, address: usize) -> Option<&DataMarker> {
        self.markers.get_marker_covering(address)
    }

    /// # Errors
    /// - [`HexerError::UnknownType`] if the type name is not registered
    /// - [`HexerError::DuplicateKey`] if a marker already starts at the address
    pub fn add_marker(&mut self, address: usize, type_name: &str) -> Result<&DataMarker> {
        let data_type = DataType::from_name(type_name)?;
        self.markers.add_marker(address, data_type)
    }

    /// # Errors
    /// Returns [`HexerError::NotFound`] if no marker starts at the address.
    pub fn remove_marker(&mut self, address: usize) -> Result<DataMarker> {
        self.markers.remove_marker(address)
    }

    /// # Errors
    /// See [`MarkerRepository::update_marker`].
    pub fn update_marker(&mut self, marker: DataMarker) -> Result<()> {
        self.markers.update_marker(marker)
    }

    pub fn list_markers(&self) -> impl Iterator<Item = &DataMarker> {
        self.markers.markers()
    }

    /// Marker file next to the document, with the configured extension
    #[must_use]
    pub fn default_marker_path(&self) -> Option<PathBuf> {
        let path = self.document.as_ref()?.filepath()?;
        Some(path.with_extension(&self.config.marker_extension))
    }

    /// Save markers to `filepath`, to the last used marker file, or to the file
    /// next to the document, in that order.
    ///
    /// # Errors
    /// - [`HexerError::InvalidArgument`] if none of those paths is available
    /// - [`HexerError::Io`] if the file cannot be written
    pub fn save_markers(&mut self, filepath: Option<&Path>) -> Result<()> {
        if filepath.is_none()
            && !self.markers.has_file_name()
            && let Some(default) = self.default_marker_path()
        {
            return self.markers.save_to_file(Some(default.as_path()));
        }
        self.markers.save_to_file(filepath)
    }

    /// Replace all markers with the content of a marker file. On error the markers
    /// are unchanged.
    ///
    /// # Errors
    /// See [`MarkerRepository::load_from_file`].
    pub fn load_markers<P: AsRef<Path>>(&mut self, filepath: P) -> Result<()> {
        self.markers.load_from_file(filepath)?;

        if let Some(document) = &self.document {
            let limit = document.len() * 8;
            let outside = self.markers.markers().filter(|m| m.end_address() > limit).count();
            if outside > 0 {
                warn!(outside, "markers reach past the end of the document");
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Find the first occurrence of `pattern` and select it. Returns its bit address.
    ///
    /// # Errors
    /// Returns [`HexerError::NoDocument`] if no document is open.
    pub fn search(&mut self, pattern: &[u8]) -> Result<Option<usize>> {
        let hit = find_first_occurrence(self.doc()?.bytes(), pattern);
        self.navigate_to_hit(hit)
    }

    /// Find the next occurrence after the selection (wrapping around) and select it.
    ///
    /// # Errors
    /// Returns [`HexerError::NoDocument`] if no document is open.
    pub fn search_next(&mut self, pattern: &[u8]) -> Result<Option<usize>> {
        let from = self.viewport.selected_address.map_or(0, |addr| addr / 8 + 1);
        let hit = find_next_occurrence(self.doc()?.bytes(), pattern, from);
        self.navigate_to_hit(hit)
    }

    /// Encode `text` as `type_name` and search for the resulting bytes.
    /// Variable-width types use the natural length of the value.
    ///
    /// # Errors
    /// - [`HexerError::UnknownType`] or [`HexerError::Parse`] if the value cannot be encoded
    /// - [`HexerError::NoDocument`] if no document is open
    pub fn search_typed(&mut self, type_name: &str, text: &str) -> Result<Option<usize>> {
        let needle = DataType::from_name(type_name)?.encode_to_fit(0, text)?;
        self.search(needle.bytes())
    }

    /// Bit addresses of every match, without moving the selection.
    ///
    /// # Errors
    /// Returns [`HexerError::NoDocument`] if no document is open.
    pub fn search_all(&self, search_type: &SearchType) -> Result<Vec<usize>> {
        let hits = search(self.doc()?.bytes(), search_type);
        Ok(hits.into_iter().map(|byte| byte * 8).collect())
    }

    fn navigate_to_hit(&mut self, hit: Option<usize>) -> Result<Option<usize>> {
        let Some(byte) = hit else {
            debug!("search found nothing");
            return Ok(None);
        };
        self.navigate_to(byte * 8)
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Select the bit address (clamped into the document) and bring it into view.
    /// Returns the selected address, `None` for an empty document.
    ///
    /// # Errors
    /// Returns [`HexerError::NoDocument`] if no document is open.
    pub fn navigate_to(&mut self, address: usize) -> Result<Option<usize>> {
        let len = self.doc()?.len();
        Ok(self.viewport.navigate_to_address(address, len))
    }

    /// Bit address under the pixel position, snapped to the start of the marker
    /// covering it. `None` outside the document.
    fn address_under(&self, x: i64, y: i64) -> Option<usize> {
        let len = self.document.as_ref()?.len();
        let address = self.viewport.address_at(x, y);
        if address / 8 >= len {
            return None;
        }
        Some(
            self.markers
                .get_marker_covering(address)
                .map_or(address, |marker| marker.address),
        )
    }

    /// Select the byte under the pixel position
    pub fn select_at(&mut self, x: i64, y: i64) -> Option<usize> {
        self.viewport.selected_address = self.address_under(x, y);
        self.viewport.selected_address
    }

    /// Hover the byte under the pixel position
    pub fn hover_at(&mut self, x: i64, y: i64) -> Option<usize> {
        self.viewport.hover_address = self.address_under(x, y);
        self.viewport.hover_address
    }
}
