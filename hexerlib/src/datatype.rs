//! The `datatype` module provides the [`DataType`] registry: the primitive binary
//! codecs used to render a [`DataFragment`] as text and to encode text back into
//! bytes.
//!
//! All multi-byte numeric types are **little-endian** (two's complement for signed
//! integers, IEEE-754 binary32/binary64 for floats). The byte order is fixed for the
//! whole registry, so marker files and edits are interchangeable between sessions.
//!
//! Encoding follows a single policy: text that cannot be parsed (or does not fit the
//! type's width) is reported as [`HexerError::Parse`]. Decoding never fails, numeric
//! types render [`PLACEHOLDER`] when the fragment holds too few bytes.

use crate::error::{HexerError, Result};
use crate::fragment::{DataFragment, MAX_LENGTH};
use std::fmt;
use std::str::FromStr;

/// Rendered by numeric decoders when there are not enough bytes to decode
pub const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Bits8,
    Float,
    Double,
    Ascii,
    Utf16,
    Hex,
}

/// Presentation group of a registered type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeGroup {
    Integers,
    FloatingPoint,
    Text,
}

impl TypeGroup {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Integers => "Integers",
            Self::FloatingPoint => "Floating point",
            Self::Text => "Text",
        }
    }
}

struct TypeInfo {
    kind: DataKind,
    name: &'static str,
    short_name: &'static str,
    num_bytes: usize,
    variable: bool,
    group: TypeGroup,
}

const fn info(
    kind: DataKind,
    name: &'static str,
    short_name: &'static str,
    num_bytes: usize,
    variable: bool,
    group: TypeGroup,
) -> TypeInfo {
    TypeInfo {
        kind,
        name,
        short_name,
        num_bytes,
        variable,
        group,
    }
}

// Order matters: UI lists are indexed by registry position.
static REGISTRY: [TypeInfo; 14] = [
    info(DataKind::Int8, "int8", "i8", 1, false, TypeGroup::Integers),
    info(DataKind::UInt8, "uint8", "u8", 1, false, TypeGroup::Integers),
    info(DataKind::Int16, "int16", "i16", 2, false, TypeGroup::Integers),
    info(DataKind::UInt16, "uint16", "u16", 2, false, TypeGroup::Integers),
    info(DataKind::Int32, "int32", "i32", 4, false, TypeGroup::Integers),
    info(DataKind::UInt32, "uint32", "u32", 4, false, TypeGroup::Integers),
    info(DataKind::Int64, "int64", "i64", 8, false, TypeGroup::Integers),
    info(DataKind::UInt64, "uint64", "u64", 8, false, TypeGroup::Integers),
    info(DataKind::Bits8, "bits8", "bin", 1, false, TypeGroup::Integers),
    info(DataKind::Float, "float", "f32", 4, false, TypeGroup::FloatingPoint),
    info(DataKind::Double, "double", "f64", 8, false, TypeGroup::FloatingPoint),
    info(DataKind::Ascii, "ascii", "asc", 8, true, TypeGroup::Text),
    info(DataKind::Utf16, "utf16", "u16s", 16, true, TypeGroup::Text),
    info(DataKind::Hex, "hex", "hex", 8, true, TypeGroup::Text),
];

/// Item of the registry listing used to build grouped UI lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEntry {
    Separator(&'static str),
    Type(DataType),
}

/// A codec identity. Fixed-width types always carry their registry width,
/// variable-width types (`ascii`, `utf16`, `hex`) carry the width of this instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    kind: DataKind,
    num_bytes: usize,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for DataType {
    type Err = HexerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// All registered data types in registry order.
///
/// # Example
/// ```
/// use hexerlib::known_data_types;
///
/// let names: Vec<&str> = known_data_types().map(|dt| dt.name()).collect();
/// assert_eq!(names.first(), Some(&"int8"));
/// ```
pub fn known_data_types() -> impl Iterator<Item = DataType> {
    REGISTRY.iter().map(|ti| DataType::of(ti.kind))
}

/// All registered data types, with a separator in front of every type group.
pub fn known_data_types_and_separators() -> Vec<RegistryEntry> {
    let mut entries = Vec::with_capacity(REGISTRY.len() + 3);
    let mut current_group = None;

    for ti in &REGISTRY {
        if current_group != Some(ti.group) {
            entries.push(RegistryEntry::Separator(ti.group.label()));
            current_group = Some(ti.group);
        }
        entries.push(RegistryEntry::Type(DataType::of(ti.kind)));
    }

    entries
}

/// Format a bit address as `0x` + 8 uppercase hex digits.
///
/// # Example
/// ```
/// use hexerlib::address_to_string;
///
/// assert_eq!(address_to_string(0x50), "0x00000050");
/// ```
#[must_use]
pub fn address_to_string(address: usize) -> String {
    format!("0x{address:08X}")
}

/// Parse a hexadecimal bit address. The `0x` prefix is optional and case is ignored.
///
/// # Errors
/// Returns [`HexerError::Parse`] if the string is empty, not hexadecimal or
/// does not fit the address space.
///
/// # Example
/// ```
/// use hexerlib::string_to_address;
///
/// assert_eq!(string_to_address("0x1f").unwrap(), 0x1F);
/// assert!(string_to_address("zz").is_err());
/// ```
pub fn string_to_address(s: &str) -> Result<usize> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    // from_str_radix would accept a leading '+'
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HexerError::parse(s, "address"));
    }

    usize::from_str_radix(digits, 16).map_err(|_| HexerError::parse(s, "address"))
}

impl DataType {
    fn info(&self) -> &'static TypeInfo {
        // Every kind has exactly one registry row
        REGISTRY
            .iter()
            .find(|ti| ti.kind == self.kind)
            .unwrap_or(&REGISTRY[0])
    }

    /// Registry instance of the kind (default width)
    #[must_use]
    pub fn of(kind: DataKind) -> Self {
        let num_bytes = REGISTRY
            .iter()
            .find(|ti| ti.kind == kind)
            .map_or(1, |ti| ti.num_bytes);
        Self { kind, num_bytes }
    }

    /// Look up a registered type by name (case-insensitive).
    ///
    /// # Errors
    /// Returns [`HexerError::UnknownType`] if no type has this name.
    pub fn from_name(name: &str) -> Result<Self> {
        let name = name.trim();
        REGISTRY
            .iter()
            .find(|ti| ti.name.eq_ignore_ascii_case(name))
            .map(|ti| Self::of(ti.kind))
            .ok_or_else(|| HexerError::UnknownType(name.to_string()))
    }

    #[must_use]
    pub const fn kind(&self) -> DataKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.info().name
    }

    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.info().short_name
    }

    #[must_use]
    pub fn group(&self) -> TypeGroup {
        self.info().group
    }

    #[must_use]
    pub const fn num_bytes(&self) -> usize {
        self.num_bytes
    }

    /// Width of the registry entry, regardless of this instance's width
    #[must_use]
    pub fn default_num_bytes(&self) -> usize {
        self.info().num_bytes
    }

    #[must_use]
    pub fn is_variable_width(&self) -> bool {
        self.info().variable
    }

    /// Returns this type re-sized to `num_bytes`.
    ///
    /// # Errors
    /// Returns [`HexerError::InvalidArgument`] if the width is 0, larger than
    /// [`MAX_LENGTH`], odd for `utf16`, or differs from the width of a fixed-width type.
    pub fn with_num_bytes(self, num_bytes: usize) -> Result<Self> {
        if !self.is_variable_width() {
            if num_bytes == self.default_num_bytes() {
                return Ok(self);
            }
            return Err(HexerError::InvalidArgument(format!(
                "{} is fixed at {} byte(s), got {num_bytes}",
                self.name(),
                self.default_num_bytes()
            )));
        }

        if num_bytes == 0 || num_bytes > MAX_LENGTH {
            return Err(HexerError::InvalidArgument(format!(
                "{} width must be within 1..={MAX_LENGTH}, got {num_bytes}",
                self.name()
            )));
        }
        if self.kind == DataKind::Utf16 && num_bytes % 2 != 0 {
            return Err(HexerError::InvalidArgument(format!(
                "utf16 width must be even, got {num_bytes}"
            )));
        }

        Ok(Self {
            kind: self.kind,
            num_bytes,
        })
    }

    /// Render the first `num_bytes` bytes of the fragment in the type's canonical form.
    #[must_use]
    pub fn decode_to_string(&self, fragment: &DataFragment) -> String {
        let bytes = fragment.bytes();
        let bytes = &bytes[..self.num_bytes.min(bytes.len())];

        let decoded = match self.kind {
            DataKind::Int8 => read::<1>(bytes).map(|b| i8::from_le_bytes(b).to_string()),
            DataKind::UInt8 => read::<1>(bytes).map(|b| u8::from_le_bytes(b).to_string()),
            DataKind::Int16 => read::<2>(bytes).map(|b| i16::from_le_bytes(b).to_string()),
            DataKind::UInt16 => read::<2>(bytes).map(|b| u16::from_le_bytes(b).to_string()),
            DataKind::Int32 => read::<4>(bytes).map(|b| i32::from_le_bytes(b).to_string()),
            DataKind::UInt32 => read::<4>(bytes).map(|b| u32::from_le_bytes(b).to_string()),
            DataKind::Int64 => read::<8>(bytes).map(|b| i64::from_le_bytes(b).to_string()),
            DataKind::UInt64 => read::<8>(bytes).map(|b| u64::from_le_bytes(b).to_string()),
            DataKind::Bits8 => read::<1>(bytes).map(|[b]| format!("{b:08b}")),
            DataKind::Float => read::<4>(bytes).map(|b| format_float(f32::from_le_bytes(b))),
            DataKind::Double => read::<8>(bytes).map(|b| format_float(f64::from_le_bytes(b))),
            DataKind::Ascii => Some(decode_ascii(bytes)),
            DataKind::Utf16 => Some(decode_utf16(bytes)),
            DataKind::Hex => Some(decode_hex(bytes)),
        };

        decoded.unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    /// Parse `text` and encode it into a fragment of exactly `num_bytes` bytes at `address`.
    /// Text types are padded with zero bytes up to the width.
    ///
    /// # Errors
    /// Returns [`HexerError::Parse`] if the text is not valid for the type,
    /// is out of range, or does not fit into the width.
    ///
    /// # Example
    /// ```
    /// use hexerlib::DataType;
    ///
    /// let dt = DataType::from_name("int16").unwrap();
    /// let df = dt.encode_string(0, "-2").unwrap();
    /// assert_eq!(df.bytes(), &[0xFE, 0xFF]);
    /// ```
    pub fn encode_string(&self, address: usize, text: &str) -> Result<DataFragment> {
        let err = || HexerError::parse(text, self.name());

        let bytes: Vec<u8> = match self.kind {
            DataKind::Int8 => parse_integer::<i8>(text).ok_or_else(err)?.to_le_bytes().to_vec(),
            DataKind::UInt8 => parse_integer::<u8>(text).ok_or_else(err)?.to_le_bytes().to_vec(),
            DataKind::Int16 => parse_integer::<i16>(text).ok_or_else(err)?.to_le_bytes().to_vec(),
            DataKind::UInt16 => parse_integer::<u16>(text).ok_or_else(err)?.to_le_bytes().to_vec(),
            DataKind::Int32 => parse_integer::<i32>(text).ok_or_else(err)?.to_le_bytes().to_vec(),
            DataKind::UInt32 => parse_integer::<u32>(text).ok_or_else(err)?.to_le_bytes().to_vec(),
            DataKind::Int64 => parse_integer::<i64>(text).ok_or_else(err)?.to_le_bytes().to_vec(),
            DataKind::UInt64 => parse_integer::<u64>(text).ok_or_else(err)?.to_le_bytes().to_vec(),
            DataKind::Bits8 => vec![parse_bits(text).ok_or_else(err)?],
            DataKind::Float => parse_float::<f32>(text).ok_or_else(err)?.to_le_bytes().to_vec(),
            DataKind::Double => parse_float::<f64>(text).ok_or_else(err)?.to_le_bytes().to_vec(),
            DataKind::Ascii => encode_ascii(text).ok_or_else(err)?,
            DataKind::Utf16 => encode_utf16(text),
            DataKind::Hex => encode_hex(text).ok_or_else(err)?,
        };

        if bytes.len() > self.num_bytes {
            return Err(err());
        }

        let mut padded = bytes;
        padded.resize(self.num_bytes, 0);
        Ok(DataFragment::from_bytes(address, &padded))
    }

    /// Encode `text`, re-sizing a variable-width type to the natural length of the
    /// encoded value first. Fixed-width types behave like [`DataType::encode_string`].
    /// Used to build search needles.
    ///
    /// # Errors
    /// Returns [`HexerError::Parse`] if the text is not valid for the type or encodes
    /// to more than [`MAX_LENGTH`] bytes (or to nothing).
    pub fn encode_to_fit(&self, address: usize, text: &str) -> Result<DataFragment> {
        if !self.is_variable_width() {
            return self.encode_string(address, text);
        }

        let natural = match self.kind {
            DataKind::Ascii => encode_ascii(text).map(|b| b.len()),
            DataKind::Utf16 => Some(encode_utf16(text).len()),
            DataKind::Hex => encode_hex(text).map(|b| b.len()),
            _ => None,
        }
        .ok_or_else(|| HexerError::parse(text, self.name()))?;

        let sized = self
            .with_num_bytes(natural)
            .map_err(|_| HexerError::parse(text, self.name()))?;
        sized.encode_string(address, text)
    }
}

fn read<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.get(..N)?.try_into().ok()
}

/// Parse a decimal (or `0x` prefixed hexadecimal) integer and narrow it to `T`
fn parse_integer<T: TryFrom<i128>>(text: &str) -> Option<T> {
    let t = text.trim();
    let value = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        i128::from_str_radix(hex, 16).ok()?
    } else {
        t.parse::<i128>().ok()?
    };
    T::try_from(value).ok()
}

/// Parse a float, rejecting values the type cannot represent: overflow to
/// infinity (unless spelled `inf`/`infinity`) and underflow of non-zero text to 0.
#[allow(clippy::float_cmp)]
fn parse_float<T: FromStr + Into<f64> + Copy>(text: &str) -> Option<T> {
    let t = text.trim();
    let value = t.parse::<T>().ok()?;
    let f: f64 = value.into();

    let literal = t.trim_start_matches(['+', '-']).to_ascii_lowercase();
    if f.is_infinite() && literal != "inf" && literal != "infinity" {
        return None;
    }
    let mantissa = literal.split('e').next().unwrap_or_default();
    if f == 0.0 && mantissa.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        return None;
    }
    Some(value)
}

fn parse_bits(text: &str) -> Option<u8> {
    let t = text.trim();
    let digits = t.strip_prefix("0b").or_else(|| t.strip_prefix("0B")).unwrap_or(t);
    if digits.is_empty() || digits.len() > 8 || !digits.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }
    u8::from_str_radix(digits, 2).ok()
}

/// Shortest round-trip representation. Scientific notation for very large or
/// very small magnitudes.
fn format_float<T: fmt::Display + fmt::LowerExp + Into<f64> + Copy>(value: T) -> String {
    let f: f64 = value.into();
    if f.is_finite() && (f.abs() >= 1e16 || (f != 0.0 && f.abs() < 1e-5)) {
        format!("{value:e}")
    } else {
        format!("{value}")
    }
}

fn decode_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| if b == b' ' || b.is_ascii_graphic() { b as char } else { '.' })
        .collect()
}

fn encode_ascii(text: &str) -> Option<Vec<u8>> {
    text.is_ascii().then(|| text.as_bytes().to_vec())
}

fn decode_utf16(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .take_while(|&u| u != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

fn encode_utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

fn decode_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse pairs of hex digits. Whitespace between pairs is ignored.
fn encode_hex(text: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.is_empty() || !digits.len().is_multiple_of(2) {
        return None;
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            let s = std::str::from_utf8(pair).ok()?;
            if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            u8::from_str_radix(s, 16).ok()
        })
        .collect()
}
