//! The `viewport` module maps bit addresses to on-screen byte cells and back.
//!
//! It is pure arithmetic over the line layout: `bytes_per_line` cells per line,
//! `start_line` at the top, and a cell size in pixels. The visible bit-address range
//! is tracked as an [`Interval`] so that navigation only recentres the view when
//! the target address is off screen.

use crate::config::WorkbenchConfig;
use crate::interval::Interval;

/// Pixel position of the top-left corner of a byte cell. Negative coordinates
/// lie above or left of the hex area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPoint {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    /// Displayed bytes per line
    bytes_per_line: usize,
    /// Line shown at the top of the view
    start_line: usize,
    /// Number of lines of the document
    total_lines: usize,
    /// Number of fully visible lines
    visible_lines: usize,
    column_width: usize,
    line_height: usize,
    x_start: usize,
    y_start: usize,
    /// Bit addresses of the first and last visible byte
    visible: Interval<usize>,
    /// Selected bit address
    pub selected_address: Option<usize>,
    /// Hovered bit address
    pub hover_address: Option<usize>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&WorkbenchConfig::default())
    }
}

fn to_i64(v: usize) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

impl Viewport {
    #[must_use]
    pub fn new(config: &WorkbenchConfig) -> Self {
        let mut viewport = Self {
            bytes_per_line: config.bytes_per_line.max(1),
            start_line: 0,
            total_lines: 1,
            visible_lines: 1,
            column_width: config.column_width.max(1),
            line_height: config.line_height.max(1),
            x_start: config.x_start,
            y_start: config.y_start,
            visible: Interval::new(0, 0),
            selected_address: None,
            hover_address: None,
        };
        viewport.resize(config.viewport_height);
        viewport
    }

    #[must_use]
    pub const fn bytes_per_line(&self) -> usize {
        self.bytes_per_line
    }

    #[must_use]
    pub const fn start_line(&self) -> usize {
        self.start_line
    }

    #[must_use]
    pub const fn total_lines(&self) -> usize {
        self.total_lines
    }

    #[must_use]
    pub const fn visible_lines(&self) -> usize {
        self.visible_lines
    }

    #[must_use]
    pub const fn visible_addresses(&self) -> Interval<usize> {
        self.visible
    }

    /// Bit address of the first byte of a line, saturating at `usize::MAX`
    #[must_use]
    pub const fn line_address(&self, line: usize) -> usize {
        line.saturating_mul(self.bytes_per_line).saturating_mul(8)
    }

    /// Update the line count for a document of `file_len` bytes.
    /// The last, partially filled line counts as a line.
    pub fn set_document_len(&mut self, file_len: usize) {
        self.total_lines = file_len.div_ceil(self.bytes_per_line).max(1);
        self.selected_address = None;
        self.hover_address = None;
        self.set_start_line(0);
    }

    /// Recompute the number of visible lines for a hex area of `height` pixels
    pub fn resize(&mut self, height: usize) {
        self.visible_lines = height.saturating_sub(self.y_start) / self.line_height;
        self.compute_visible();
    }

    /// Move the top of the view, clamped to `[0, total_lines - 1]`
    pub fn set_start_line(&mut self, line: usize) {
        self.start_line = line.min(self.total_lines.saturating_sub(1));
        self.compute_visible();
    }

    /// Scroll by `delta` lines (negative scrolls up)
    pub fn scroll_lines(&mut self, delta: isize) {
        self.set_start_line(self.start_line.saturating_add_signed(delta));
    }

    fn compute_visible(&mut self) {
        let min = self.line_address(self.start_line);
        let span = self.line_address(self.visible_lines);
        // With no visible line the interval degenerates to the top address
        let max = if span > 0 { min.saturating_add(span - 8) } else { min };
        self.visible = Interval::new(min, max);
    }

    /// Pixel position of the byte cell holding `address`
    #[must_use]
    pub fn location_of_address(&self, address: usize) -> CellPoint {
        let bpl = to_i64(self.bytes_per_line);
        let rel_byte = to_i64(address / 8) - to_i64(self.start_line) * bpl;
        let column = rel_byte.rem_euclid(bpl);
        let line = rel_byte.div_euclid(bpl);

        CellPoint {
            x: to_i64(self.x_start).saturating_add(column.saturating_mul(to_i64(self.column_width))),
            y: to_i64(self.y_start).saturating_add(line.saturating_mul(to_i64(self.line_height))),
        }
    }

    /// Bit address of the byte cell at a pixel position. Positions left of or above
    /// the hex area map to the first column / line, positions right of the last
    /// column map to the last column.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn address_at(&self, x: i64, y: i64) -> usize {
        let dy = y.saturating_sub(to_i64(self.y_start)).max(0) as usize;
        let dx = x.saturating_sub(to_i64(self.x_start)).max(0) as usize;

        let line = self.start_line.saturating_add(dy / self.line_height);
        let column = (dx / self.column_width).min(self.bytes_per_line - 1);

        self.line_address(line).saturating_add(column * 8)
    }

    /// Select `address` (clamped into `[0, file_len * 8)` and aligned to a byte)
    /// and recentre the view if it is not visible. Returns the selected address,
    /// or `None` for an empty document.
    pub fn navigate_to_address(&mut self, address: usize, file_len: usize) -> Option<usize> {
        if file_len == 0 {
            self.selected_address = None;
            return None;
        }

        let address = address.min((file_len - 1) * 8) & !7;
        self.selected_address = Some(address);

        if !self.visible.contains(address) {
            let line = address / 8 / self.bytes_per_line;
            self.set_start_line(line.saturating_sub(self.visible_lines / 2));
        }

        Some(address)
    }
}
