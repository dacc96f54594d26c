//! Environment-driven configuration.
//!
//! Everything touching the process environment lives in one test so the
//! variables are never read and written concurrently.

use area_parser::{AreaError, ByteOrder, DecoderConfig};

const VARS: [&str; 3] = ["AREA_BYTE_ORDER", "AREA_SKIP_LINE_PREFIXES", "AREA_STRICT_HEADER"];

fn clear() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn test_from_env() {
    clear();
    assert_eq!(DecoderConfig::from_env().unwrap(), DecoderConfig::default());

    std::env::set_var("AREA_BYTE_ORDER", "LE");
    std::env::set_var("AREA_SKIP_LINE_PREFIXES", "true");
    std::env::set_var("AREA_STRICT_HEADER", "1");
    let config = DecoderConfig::from_env().unwrap();
    assert_eq!(config.byte_order, ByteOrder::LittleEndian);
    assert!(config.skip_line_prefixes);
    assert!(config.strict);

    std::env::set_var("AREA_BYTE_ORDER", "middle");
    assert!(matches!(DecoderConfig::from_env(), Err(AreaError::Config(_))));

    std::env::set_var("AREA_BYTE_ORDER", "big");
    std::env::set_var("AREA_STRICT_HEADER", "sometimes");
    assert!(matches!(DecoderConfig::from_env(), Err(AreaError::Config(_))));

    clear();
}
