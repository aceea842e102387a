//! # `hexerlib`
//!
//! `hexerlib` is the core of a hex editor workbench: it interprets raw bytes through
//! typed codecs, annotates byte ranges with markers, and maps addresses to the cells
//! of a hex view.
//!
//! The library provides:
//! - Registry of binary codecs (via [`DataType`]) with string encode/decode.
//! - Bounded byte windows passed between codecs and data (via [`DataFragment`]).
//! - Address-sorted marker index with covering lookups and JSON persistence
//!   (via [`MarkerRepository`]).
//! - Byte, text and regex search, and viewport math (via [`Viewport`]).
//! - A session facade owning document, markers and viewport (via [`Workbench`]).
//! - Error handling with [`HexerError`].
//!
//! All addresses are bit addresses: the byte index times 8.
//!
//! ## Example
//!
//! ```
//! use hexerlib::Workbench;
//!
//! let mut wb = Workbench::default();
//! wb.open_bytes(vec![0x00, 0x2A, 0x00, 0x00, 0x00]);
//! wb.add_marker(8, "int32").unwrap();
//!
//! let fragment = wb.fragment_at(8).unwrap();
//! assert_eq!(wb.decode("int32", &fragment).unwrap(), "42");
//! assert_eq!(wb.lookup_covering_marker(24).unwrap().address, 8);
//! ```

mod config;
mod datatype;
mod document;
mod error;
mod fragment;
mod interval;
mod marker;
mod repository;
mod search;
mod viewport;
mod workbench;

// Public APIs
pub use config::WorkbenchConfig;
pub use datatype::{
    DataKind, DataType, PLACEHOLDER, RegistryEntry, TypeGroup, address_to_string,
    known_data_types, known_data_types_and_separators, string_to_address,
};
pub use document::HexDocument;
pub use error::{HexerError, Result};
pub use fragment::{DataFragment, MAX_LENGTH};
pub use interval::Interval;
pub use marker::{DEFAULT_NOTE, DataMarker};
pub use repository::MarkerRepository;
pub use search::{
    SearchType, find_first_occurrence, find_next_occurrence, parse_str_into_bytes, search,
};
pub use viewport::{CellPoint, Viewport};
pub use workbench::Workbench;
