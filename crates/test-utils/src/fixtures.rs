//! Common test fixtures for AREA decoder tests.
//!
//! Values here describe a plausible 4 km Lambert radar composite and are
//! what [`crate::AreaFileBuilder`] writes unless told otherwise.

/// Header word values.
pub mod header {
    /// Word indices.
    pub mod words {
        pub const HEMISPHERE_FLAG: usize = 1;
        pub const CREATION_DATE: usize = 3;
        pub const CREATION_TIME: usize = 4;
        pub const UPPER_LEFT_ROW: usize = 5;
        pub const UPPER_LEFT_COL: usize = 6;
        pub const NUM_ROWS: usize = 8;
        pub const NUM_COLS: usize = 9;
        pub const BYTES_PER_POINT: usize = 10;
        pub const ROW_RESOLUTION: usize = 11;
        pub const COL_RESOLUTION: usize = 12;
        pub const NUM_BANDS: usize = 13;
        pub const DATA_BLOCK_OFFSET: usize = 33;
        pub const NAV_BLOCK_OFFSET: usize = 34;
        pub const VALIDATION_CODE: usize = 35;
        pub const DOCUMENTATION_PREFIX: usize = 48;
        pub const CALIBRATION_PREFIX: usize = 49;
        pub const BAND_LIST_PREFIX: usize = 50;
        pub const SOURCE_TYPE: usize = 51;
    }

    /// Western hemisphere.
    pub const HEMISPHERE_FLAG: i32 = 0;
    /// 2024 day 15 (15 January).
    pub const CREATION_DATE: i32 = 124_015;
    /// 12:30:45; seconds are dropped on decode.
    pub const CREATION_TIME: i32 = 123_045;
    pub const UPPER_LEFT_ROW: i32 = 100;
    pub const UPPER_LEFT_COL: i32 = 200;
    pub const ROW_RESOLUTION: i32 = 1;
    pub const COL_RESOLUTION: i32 = 1;
    pub const SOURCE_TYPE: &str = "RADR";

    /// Size of the directory written by the builder.
    pub const HEADER_BYTES: usize = 256;
    pub const NAV_BLOCK_OFFSET: usize = 256;
    pub const DATA_BLOCK_OFFSET: usize = 384;
}

/// Navigation block values (byte offsets relative to the block start).
pub mod navigation {
    pub mod offsets {
        pub const PROJECTION_TYPE: usize = 0;
        pub const POLE_ROW: usize = 4;
        pub const POLE_COL: usize = 8;
        pub const LAMBERT_LAT1: usize = 12;
        pub const LAMBERT_LAT2: usize = 16;
        pub const GRID_SPACING: usize = 20;
        pub const POLE_LONGITUDE: usize = 24;
        pub const POLE_LATITUDE: usize = 36;
    }

    pub const PROJECTION_TYPE: &str = "LAMB";
    pub const POLE_ROW: i32 = 1200;
    pub const POLE_COL: i32 = -300;
    /// 25°00'00"
    pub const LAMBERT_LAT1: i32 = 250_000;
    /// 25°30'00"
    pub const LAMBERT_LAT2: i32 = 253_000;
    /// Metres.
    pub const GRID_SPACING: i32 = 4_000;
    /// 95°00'00", negated on decode in the western hemisphere.
    pub const POLE_LONGITUDE: i32 = 950_000;
    /// Zero means the north pole.
    pub const POLE_LATITUDE: i32 = 0;

    /// Size of the block written by the builder.
    pub const BLOCK_BYTES: usize = 128;
}

/// Encoded sample pairs (most significant byte first) and their values.
pub mod samples {
    pub const NULL: [u8; 2] = [0xFF, 0xFF];

    pub const KNOWN: [([u8; 2], f32); 6] = [
        ([0x00, 0x00], 0.0),
        ([0x00, 0x05], 0.005),
        ([0x0F, 0xFF], 4.095),
        ([0x10, 0x00], 4.096),
        ([0x20, 0x01], 8.194),
        ([0x13, 0xE8], 5.096),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_do_not_overlap() {
        assert!(header::NAV_BLOCK_OFFSET >= header::HEADER_BYTES);
        assert!(header::DATA_BLOCK_OFFSET >= header::NAV_BLOCK_OFFSET + navigation::BLOCK_BYTES);
        assert!(header::words::SOURCE_TYPE * 4 + 4 <= header::HEADER_BYTES);
        assert!(navigation::offsets::POLE_LATITUDE + 4 <= navigation::BLOCK_BYTES);
    }

    #[test]
    fn test_known_samples_are_not_null() {
        for (pair, _) in samples::KNOWN {
            assert_ne!(pair, samples::NULL);
        }
    }
}
