//! Synthetic AREA file generation.
//!
//! [`AreaFileBuilder`] lays out a directory, a navigation block and a data
//! block exactly where the header words say they are, so decoded values can
//! be checked against what was written.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::fixtures::{header, navigation, samples};

/// Filler written into per-line prefix bytes.
pub const PREFIX_FILL: u8 = 0xAA;

/// Pack degrees/minutes/seconds into the `DDDMMSS` word format.
///
/// The sign of `degrees` applies to the whole angle.
pub fn pack_dms(degrees: i32, minutes: i32, seconds: i32) -> i32 {
    let magnitude = degrees.abs() * 10_000 + minutes * 100 + seconds;
    if degrees < 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Encode a value in thousandths as a sample pair (most significant byte
/// first). Returns `None` when the value has no exact encoding.
///
/// # Example
///
/// ```
/// use test_utils::encode_magnitude;
///
/// assert_eq!(encode_magnitude(5), Some([0x00, 0x05]));
/// assert_eq!(encode_magnitude(4096), Some([0x10, 0x00]));
/// assert_eq!(encode_magnitude(8193), None);
/// ```
pub fn encode_magnitude(thousandths: u32) -> Option<[u8; 2]> {
    if thousandths < 0x1000 {
        return Some([(thousandths >> 8) as u8, thousandths as u8]);
    }
    for exponent in 1u32..=15 {
        let shift = exponent - 1;
        let mantissa = thousandths >> shift;
        if (0x1000..0x2000).contains(&mantissa) {
            if mantissa << shift != thousandths {
                return None;
            }
            let low = mantissa & 0x0FFF;
            let pair = [((exponent << 4) | (low >> 8)) as u8, low as u8];
            // the top of the range collides with the null pattern
            return (pair != samples::NULL).then_some(pair);
        }
    }
    None
}

/// Builds a synthetic AREA file.
///
/// Defaults come from [`crate::fixtures`]: a big-endian, single-band,
/// 2-byte image with the header at 0, navigation at 256 and data at 384.
#[derive(Debug, Clone)]
pub struct AreaFileBuilder {
    rows: usize,
    cols: usize,
    words: BTreeMap<usize, i32>,
    nav_words: BTreeMap<usize, i32>,
    source_type: [u8; 4],
    projection_type: [u8; 4],
    nav_offset: usize,
    data_offset: usize,
    samples: Vec<[u8; 2]>,
    line_prefix: usize,
    little_endian: bool,
}

fn tag(value: &str) -> [u8; 4] {
    let mut out = [b' '; 4];
    for (slot, byte) in out.iter_mut().zip(value.bytes()) {
        *slot = byte;
    }
    out
}

impl AreaFileBuilder {
    /// A `rows × cols` image with every sample zero.
    pub fn new(rows: usize, cols: usize) -> Self {
        use header::words as w;
        use navigation::offsets as n;

        let words = BTreeMap::from([
            (w::HEMISPHERE_FLAG, header::HEMISPHERE_FLAG),
            (w::CREATION_DATE, header::CREATION_DATE),
            (w::CREATION_TIME, header::CREATION_TIME),
            (w::UPPER_LEFT_ROW, header::UPPER_LEFT_ROW),
            (w::UPPER_LEFT_COL, header::UPPER_LEFT_COL),
            (w::NUM_ROWS, rows as i32),
            (w::NUM_COLS, cols as i32),
            (w::BYTES_PER_POINT, 2),
            (w::ROW_RESOLUTION, header::ROW_RESOLUTION),
            (w::COL_RESOLUTION, header::COL_RESOLUTION),
            (w::NUM_BANDS, 1),
        ]);
        let nav_words = BTreeMap::from([
            (n::POLE_ROW, navigation::POLE_ROW),
            (n::POLE_COL, navigation::POLE_COL),
            (n::LAMBERT_LAT1, navigation::LAMBERT_LAT1),
            (n::LAMBERT_LAT2, navigation::LAMBERT_LAT2),
            (n::GRID_SPACING, navigation::GRID_SPACING),
            (n::POLE_LONGITUDE, navigation::POLE_LONGITUDE),
            (n::POLE_LATITUDE, navigation::POLE_LATITUDE),
        ]);

        Self {
            rows,
            cols,
            words,
            nav_words,
            source_type: tag(header::SOURCE_TYPE),
            projection_type: tag(navigation::PROJECTION_TYPE),
            nav_offset: header::NAV_BLOCK_OFFSET,
            data_offset: header::DATA_BLOCK_OFFSET,
            samples: vec![[0, 0]; rows * cols],
            line_prefix: 0,
            little_endian: false,
        }
    }

    /// Set a raw header word. Offsets, dimensions and prefix lengths set
    /// this way are written as given but do not move the blocks.
    pub fn word(mut self, index: usize, value: i32) -> Self {
        self.words.insert(index, value);
        self
    }

    /// Set a raw navigation word at a byte offset within the block.
    pub fn nav_word(mut self, offset: usize, value: i32) -> Self {
        self.nav_words.insert(offset, value);
        self
    }

    pub fn source_type(mut self, value: &str) -> Self {
        self.source_type = tag(value);
        self
    }

    pub fn projection_type(mut self, value: &str) -> Self {
        self.projection_type = tag(value);
        self
    }

    /// Place the data block at a different offset (must be past the
    /// navigation block).
    pub fn data_offset(mut self, offset: usize) -> Self {
        self.data_offset = offset;
        self
    }

    /// Row-major sample pairs, most significant byte first.
    pub fn samples(mut self, pairs: Vec<[u8; 2]>) -> Self {
        assert_eq!(pairs.len(), self.rows * self.cols, "sample count mismatch");
        self.samples = pairs;
        self
    }

    /// Set one 0-based sample.
    pub fn sample(mut self, row: usize, col: usize, pair: [u8; 2]) -> Self {
        self.samples[row * self.cols + col] = pair;
        self
    }

    /// Interleave per-line prefixes and record their lengths in the header.
    pub fn line_prefixes(
        mut self,
        documentation: usize,
        calibration: usize,
        band_list: usize,
        validation_code: bool,
    ) -> Self {
        use header::words as w;
        self.words.insert(w::DOCUMENTATION_PREFIX, documentation as i32);
        self.words.insert(w::CALIBRATION_PREFIX, calibration as i32);
        self.words.insert(w::BAND_LIST_PREFIX, band_list as i32);
        self.words.insert(w::VALIDATION_CODE, validation_code as i32);
        self.line_prefix =
            documentation + calibration + band_list + if validation_code { 4 } else { 0 };
        self
    }

    /// Write words and sample pairs byte-reversed.
    pub fn little_endian(mut self) -> Self {
        self.little_endian = true;
        self
    }

    fn put_word(&self, buf: &mut [u8], at: usize, value: i32) {
        let bytes = if self.little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        buf[at..at + 4].copy_from_slice(&bytes);
    }

    /// Total length of the file `build` produces.
    pub fn file_len(&self) -> usize {
        self.data_offset + self.rows * (self.line_prefix + self.cols * 2)
    }

    pub fn build(&self) -> Vec<u8> {
        use header::words as w;

        let mut buf = vec![0u8; self.data_offset];

        for (&index, &value) in &self.words {
            self.put_word(&mut buf, index * 4, value);
        }
        if !self.words.contains_key(&w::NAV_BLOCK_OFFSET) {
            self.put_word(&mut buf, w::NAV_BLOCK_OFFSET * 4, self.nav_offset as i32);
        }
        if !self.words.contains_key(&w::DATA_BLOCK_OFFSET) {
            self.put_word(&mut buf, w::DATA_BLOCK_OFFSET * 4, self.data_offset as i32);
        }
        let st = w::SOURCE_TYPE * 4;
        buf[st..st + 4].copy_from_slice(&self.source_type);

        let nav = self.nav_offset;
        buf[nav..nav + 4].copy_from_slice(&self.projection_type);
        for (&offset, &value) in &self.nav_words {
            self.put_word(&mut buf, nav + offset, value);
        }

        for row in self.samples.chunks(self.cols.max(1)) {
            buf.extend(std::iter::repeat(PREFIX_FILL).take(self.line_prefix));
            for &[hi, lo] in row {
                if self.little_endian {
                    buf.extend_from_slice(&[lo, hi]);
                } else {
                    buf.extend_from_slice(&[hi, lo]);
                }
            }
        }

        buf
    }

    /// Write the file into `dir` and return its path.
    pub fn write_to(&self, dir: &Path, name: &str) -> io::Result<PathBuf> {
        let path = dir.join(name);
        std::fs::write(&path, self.build())?;
        Ok(path)
    }
}
