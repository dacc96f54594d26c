//! Configuration for the AREA decoder.

use area_common::{AreaError, AreaResult};
use serde::{Deserialize, Serialize};

use crate::reader::ByteOrder;

/// Configuration for opening and decoding AREA files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Byte order of the integer words and sample pairs.
    pub byte_order: ByteOrder,

    /// Skip each line's documentation/calibration/band-list/validation
    /// prefix. When off, samples are read as one flat stream from the data
    /// block offset.
    pub skip_line_prefixes: bool,

    /// Validate dimensions, offsets and layout against the resource before
    /// decoding.
    pub strict: bool,
}

impl DecoderConfig {
    pub fn new(byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            ..Self::default()
        }
    }

    pub fn with_line_prefixes_skipped(mut self, skip: bool) -> Self {
        self.skip_line_prefixes = skip;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// An unrecognised `AREA_BYTE_ORDER` is an error rather than a silent
    /// fallback, since guessing the order produces a garbled grid.
    pub fn from_env() -> AreaResult<Self> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("AREA_BYTE_ORDER") {
            config.byte_order = val.parse()?;
        }

        if let Ok(val) = std::env::var("AREA_SKIP_LINE_PREFIXES") {
            config.skip_line_prefixes = parse_flag("AREA_SKIP_LINE_PREFIXES", &val)?;
        }

        if let Ok(val) = std::env::var("AREA_STRICT_HEADER") {
            config.strict = parse_flag("AREA_STRICT_HEADER", &val)?;
        }

        Ok(config)
    }
}

fn parse_flag(name: &str, val: &str) -> AreaResult<bool> {
    match val.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(AreaError::Config(format!(
            "{} must be a boolean, got '{}'",
            name, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DecoderConfig::default();
        assert_eq!(config.byte_order, ByteOrder::BigEndian);
        assert!(!config.skip_line_prefixes);
        assert!(!config.strict);
    }

    #[test]
    fn test_builders() {
        let config = DecoderConfig::new(ByteOrder::LittleEndian)
            .with_line_prefixes_skipped(true)
            .with_strict(true);
        assert_eq!(config.byte_order, ByteOrder::LittleEndian);
        assert!(config.skip_line_prefixes);
        assert!(config.strict);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("X", "TRUE").unwrap());
        assert!(parse_flag("X", "1").unwrap());
        assert!(!parse_flag("X", "off").unwrap());
        assert!(parse_flag("X", "maybe").is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: DecoderConfig =
            serde_json::from_str(r#"{"byte_order": "little", "strict": true}"#).unwrap();
        assert_eq!(config.byte_order, ByteOrder::LittleEndian);
        assert!(config.strict);
        assert!(!config.skip_line_prefixes);
    }

    #[test]
    fn test_serialize_names() {
        let json = serde_json::to_value(DecoderConfig::default()).unwrap();
        assert_eq!(json["byte_order"], "big");
        assert_eq!(json["skip_line_prefixes"], false);
    }
}
