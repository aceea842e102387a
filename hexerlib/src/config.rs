use crate::error::{HexerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings of a workbench session. Every field has a default, so a config file
/// only needs to list the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    /// Displayed bytes per line
    pub bytes_per_line: usize,
    /// Width of one byte cell in pixels
    pub column_width: usize,
    /// Height of one line in pixels
    pub line_height: usize,
    /// Left offset of the first byte column (room for the address label)
    pub x_start: usize,
    /// Top offset of the first line
    pub y_start: usize,
    /// Height of the hex area in pixels
    pub viewport_height: usize,
    /// Extension of marker files
    pub marker_extension: String,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            bytes_per_line: 32,
            column_width: 22,
            line_height: 18,
            x_start: 92,
            y_start: 1,
            viewport_height: 720,
            marker_extension: "hmf".to_string(),
        }
    }
}

impl WorkbenchConfig {
    /// Reads a JSON config file. Missing fields take their default values.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or holds
    /// invalid values (see [`WorkbenchConfig::validate`]).
    pub fn from_file<P: AsRef<Path>>(filepath: P) -> Result<Self> {
        let path = filepath.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| HexerError::io(path, e))?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`HexerError::InvalidArgument`] if a size used as a divisor is 0.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("bytes_per_line", self.bytes_per_line),
            ("column_width", self.column_width),
            ("line_height", self.line_height),
        ] {
            if value == 0 {
                return Err(HexerError::InvalidArgument(format!("{name} must be > 0")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        // Act
        let cfg = WorkbenchConfig::default();

        // Assert
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.bytes_per_line, 32);
        assert_eq!(cfg.marker_extension, "hmf");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| panic!("{e}"));
        let _ = write!(file, r#"{{ "bytes_per_line": 16 }}"#);

        // Act
        let cfg = WorkbenchConfig::from_file(file.path());

        // Assert
        assert_eq!(cfg.as_ref().map(|c| c.bytes_per_line).ok(), Some(16));
        assert_eq!(cfg.map(|c| c.line_height).ok(), Some(18));
    }

    #[test]
    fn test_zero_bytes_per_line_rejected() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| panic!("{e}"));
        let _ = write!(file, r#"{{ "bytes_per_line": 0 }}"#);

        // Act
        let res = WorkbenchConfig::from_file(file.path());

        // Assert
        assert!(matches!(res, Err(HexerError::InvalidArgument(_))));
    }

    #[test]
    fn test_missing_file() {
        // Act
        let res = WorkbenchConfig::from_file("does/not/exist.json");

        // Assert
        assert!(matches!(res, Err(HexerError::Io { .. })));
    }
}
