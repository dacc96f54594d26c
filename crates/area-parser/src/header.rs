//! AREA directory (header) fields.
//!
//! The directory is a run of 4-byte words at the start of the file. Only the
//! words below are used; the rest are reserved. Each field is read at most
//! once per `HeaderModel` and cached only after a successful read, so a
//! failed read leaves the field uncomputed rather than half-set.

use std::cell::OnceCell;

use area_common::{AreaError, AreaResult};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, trace};

use crate::reader::{ByteSource, ReadSession};

/// Header word positions (word index × 4 = byte offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderWord {
    HemisphereFlag,
    CreationDate,
    CreationTime,
    UpperLeftRow,
    UpperLeftCol,
    NumRows,
    NumCols,
    BytesPerPoint,
    RowResolution,
    ColResolution,
    NumBands,
    DataBlockOffset,
    NavBlockOffset,
    ValidationCode,
    DocumentationPrefixLength,
    CalibrationPrefixLength,
    BandListPrefixLength,
}

impl HeaderWord {
    pub const COUNT: usize = 17;

    pub const ALL: [HeaderWord; Self::COUNT] = [
        HeaderWord::HemisphereFlag,
        HeaderWord::CreationDate,
        HeaderWord::CreationTime,
        HeaderWord::UpperLeftRow,
        HeaderWord::UpperLeftCol,
        HeaderWord::NumRows,
        HeaderWord::NumCols,
        HeaderWord::BytesPerPoint,
        HeaderWord::RowResolution,
        HeaderWord::ColResolution,
        HeaderWord::NumBands,
        HeaderWord::DataBlockOffset,
        HeaderWord::NavBlockOffset,
        HeaderWord::ValidationCode,
        HeaderWord::DocumentationPrefixLength,
        HeaderWord::CalibrationPrefixLength,
        HeaderWord::BandListPrefixLength,
    ];

    /// Word index from the start of the file.
    pub fn index(self) -> u64 {
        match self {
            HeaderWord::HemisphereFlag => 1,
            HeaderWord::CreationDate => 3,
            HeaderWord::CreationTime => 4,
            HeaderWord::UpperLeftRow => 5,
            HeaderWord::UpperLeftCol => 6,
            HeaderWord::NumRows => 8,
            HeaderWord::NumCols => 9,
            HeaderWord::BytesPerPoint => 10,
            HeaderWord::RowResolution => 11,
            HeaderWord::ColResolution => 12,
            HeaderWord::NumBands => 13,
            HeaderWord::DataBlockOffset => 33,
            HeaderWord::NavBlockOffset => 34,
            HeaderWord::ValidationCode => 35,
            HeaderWord::DocumentationPrefixLength => 48,
            HeaderWord::CalibrationPrefixLength => 49,
            HeaderWord::BandListPrefixLength => 50,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HeaderWord::HemisphereFlag => "hemisphere_flag",
            HeaderWord::CreationDate => "creation_date",
            HeaderWord::CreationTime => "creation_time",
            HeaderWord::UpperLeftRow => "upper_left_row",
            HeaderWord::UpperLeftCol => "upper_left_col",
            HeaderWord::NumRows => "num_rows",
            HeaderWord::NumCols => "num_cols",
            HeaderWord::BytesPerPoint => "bytes_per_point",
            HeaderWord::RowResolution => "row_resolution",
            HeaderWord::ColResolution => "col_resolution",
            HeaderWord::NumBands => "num_bands",
            HeaderWord::DataBlockOffset => "data_block_offset",
            HeaderWord::NavBlockOffset => "nav_block_offset",
            HeaderWord::ValidationCode => "validation_code",
            HeaderWord::DocumentationPrefixLength => "documentation_prefix_length",
            HeaderWord::CalibrationPrefixLength => "calibration_prefix_length",
            HeaderWord::BandListPrefixLength => "band_list_prefix_length",
        }
    }

    /// Byte offset of the word.
    pub fn byte_offset(self) -> u64 {
        self.index() * 4
    }
}

/// Word index of the 4-character source type.
pub const SOURCE_TYPE_WORD: u64 = 51;

/// Length of the validation code prefix when one is present.
pub const VALIDATION_CODE_LENGTH: i32 = 4;

/// Every header field at once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderFields {
    pub hemisphere_flag: i32,
    pub creation_time: DateTime<Utc>,
    pub upper_left_row: i32,
    pub upper_left_col: i32,
    pub num_rows: i32,
    pub num_cols: i32,
    pub bytes_per_point: i32,
    pub num_bands: i32,
    pub row_resolution: i32,
    pub col_resolution: i32,
    pub data_block_offset: i32,
    pub nav_block_offset: i32,
    pub validation_code_length: i32,
    pub documentation_prefix_length: i32,
    pub calibration_prefix_length: i32,
    pub band_list_prefix_length: i32,
    pub source_type: String,
}

impl HeaderFields {
    pub fn line_data_length(&self) -> i64 {
        line_data_length(self.num_bands, self.num_cols, self.bytes_per_point)
    }

    pub fn line_prefix_length(&self) -> i64 {
        line_prefix_length(
            self.documentation_prefix_length,
            self.calibration_prefix_length,
            self.band_list_prefix_length,
            self.validation_code_length,
        )
    }

    pub fn line_length(&self) -> i64 {
        self.line_prefix_length().saturating_add(self.line_data_length())
    }

    pub fn data_block_length(&self) -> i64 {
        data_block_length(self.num_rows, self.line_length())
    }

    /// Column resolution × row resolution.
    pub fn image_resolution(&self) -> i64 {
        self.col_resolution as i64 * self.row_resolution as i64
    }
}

/// Bytes of sample data in one line. Saturates on nonsense word values.
pub fn line_data_length(num_bands: i32, num_cols: i32, bytes_per_point: i32) -> i64 {
    (num_bands as i64)
        .saturating_mul(num_cols as i64)
        .saturating_mul(bytes_per_point as i64)
}

/// Bytes of prefix preceding the samples of one line.
pub fn line_prefix_length(
    documentation: i32,
    calibration: i32,
    band_list: i32,
    validation_code: i32,
) -> i64 {
    documentation as i64 + calibration as i64 + band_list as i64 + validation_code as i64
}

/// Size of the whole data block.
pub fn data_block_length(num_rows: i32, line_length: i64) -> i64 {
    (num_rows as i64).saturating_mul(line_length)
}

/// Normalize the raw validation-code word to a prefix length.
pub fn validation_code_length(raw: i32) -> i32 {
    if raw != 0 {
        VALIDATION_CODE_LENGTH
    } else {
        0
    }
}

/// Combine the packed `YYDDD` date and `HHMMSS` time words.
///
/// The year is `1900 + YY`; the day of year is added as an offset from
/// January 1st, so out-of-range days roll over rather than fail. Seconds
/// are not carried.
pub fn decode_timestamp(date: i32, time: i32) -> AreaResult<DateTime<Utc>> {
    if date < 0 {
        return Err(AreaError::invalid_field(
            HeaderWord::CreationDate.name(),
            date as i64,
            "packed date must not be negative",
        ));
    }
    if time < 0 {
        return Err(AreaError::invalid_field(
            HeaderWord::CreationTime.name(),
            time as i64,
            "packed time must not be negative",
        ));
    }

    let year = 1900 + date / 1000;
    let day_of_year = (date % 1000) as i64;
    let hour = (time / 10_000) as u32;
    let minute = ((time / 100) % 100) as u32;

    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .ok_or_else(|| {
            AreaError::invalid_field(
                HeaderWord::CreationTime.name(),
                time as i64,
                format!("cannot build {}-01-01 {:02}:{:02}", year, hour, minute),
            )
        })?;

    let naive = start + Duration::days(day_of_year - 1);
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

/// Lazily read, cached header fields.
#[derive(Debug)]
pub struct HeaderModel {
    words: [OnceCell<i32>; HeaderWord::COUNT],
    source_type: OnceCell<String>,
    creation_time: OnceCell<DateTime<Utc>>,
}

impl Default for HeaderModel {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderModel {
    pub fn new() -> Self {
        Self {
            words: std::array::from_fn(|_| OnceCell::new()),
            source_type: OnceCell::new(),
            creation_time: OnceCell::new(),
        }
    }

    /// The cached value of a word, if it has been read.
    pub fn cached(&self, word: HeaderWord) -> Option<i32> {
        self.words[word as usize].get().copied()
    }

    /// Raw value of a header word, read on first access.
    pub fn word<S: ByteSource>(
        &self,
        word: HeaderWord,
        session: &mut ReadSession<'_, S>,
    ) -> AreaResult<i32> {
        let cell = &self.words[word as usize];
        if let Some(value) = cell.get() {
            return Ok(*value);
        }

        let value = session
            .reader()?
            .read_word(0, word.index(), word.name())?;
        trace!(field = word.name(), value, "Read header word");

        let _ = cell.set(value);
        Ok(value)
    }

    /// 0 or 4, depending on whether a validation code is present.
    pub fn validation_code_length<S: ByteSource>(
        &self,
        session: &mut ReadSession<'_, S>,
    ) -> AreaResult<i32> {
        self.word(HeaderWord::ValidationCode, session)
            .map(validation_code_length)
    }

    /// Four-character source type code.
    pub fn source_type<S: ByteSource>(
        &self,
        session: &mut ReadSession<'_, S>,
    ) -> AreaResult<String> {
        if let Some(value) = self.source_type.get() {
            return Ok(value.clone());
        }
        let value = session
            .reader()?
            .read_ascii_at(SOURCE_TYPE_WORD * 4, 4, "source_type")?;
        let _ = self.source_type.set(value.clone());
        Ok(value)
    }

    pub fn creation_time<S: ByteSource>(
        &self,
        session: &mut ReadSession<'_, S>,
    ) -> AreaResult<DateTime<Utc>> {
        if let Some(value) = self.creation_time.get() {
            return Ok(*value);
        }
        let date = self.word(HeaderWord::CreationDate, session)?;
        let time = self.word(HeaderWord::CreationTime, session)?;
        let value = decode_timestamp(date, time)?;
        let _ = self.creation_time.set(value);
        Ok(value)
    }

    /// Sum of all per-line prefix lengths.
    pub fn line_prefix_length<S: ByteSource>(
        &self,
        session: &mut ReadSession<'_, S>,
    ) -> AreaResult<i64> {
        Ok(line_prefix_length(
            self.word(HeaderWord::DocumentationPrefixLength, session)?,
            self.word(HeaderWord::CalibrationPrefixLength, session)?,
            self.word(HeaderWord::BandListPrefixLength, session)?,
            self.validation_code_length(session)?,
        ))
    }

    pub fn line_data_length<S: ByteSource>(
        &self,
        session: &mut ReadSession<'_, S>,
    ) -> AreaResult<i64> {
        Ok(line_data_length(
            self.word(HeaderWord::NumBands, session)?,
            self.word(HeaderWord::NumCols, session)?,
            self.word(HeaderWord::BytesPerPoint, session)?,
        ))
    }

    pub fn line_length<S: ByteSource>(
        &self,
        session: &mut ReadSession<'_, S>,
    ) -> AreaResult<i64> {
        Ok(self
            .line_prefix_length(session)?
            .saturating_add(self.line_data_length(session)?))
    }

    pub fn data_block_length<S: ByteSource>(
        &self,
        session: &mut ReadSession<'_, S>,
    ) -> AreaResult<i64> {
        let num_rows = self.word(HeaderWord::NumRows, session)?;
        Ok(data_block_length(num_rows, self.line_length(session)?))
    }

    /// Read every field through one session.
    pub fn fields<S: ByteSource>(
        &self,
        session: &mut ReadSession<'_, S>,
    ) -> AreaResult<HeaderFields> {
        let creation_time = self.creation_time(session)?;
        let source_type = self.source_type(session)?;

        let mut get = |w: HeaderWord| self.word(w, session);
        let fields = HeaderFields {
            hemisphere_flag: get(HeaderWord::HemisphereFlag)?,
            creation_time,
            upper_left_row: get(HeaderWord::UpperLeftRow)?,
            upper_left_col: get(HeaderWord::UpperLeftCol)?,
            num_rows: get(HeaderWord::NumRows)?,
            num_cols: get(HeaderWord::NumCols)?,
            bytes_per_point: get(HeaderWord::BytesPerPoint)?,
            num_bands: get(HeaderWord::NumBands)?,
            row_resolution: get(HeaderWord::RowResolution)?,
            col_resolution: get(HeaderWord::ColResolution)?,
            data_block_offset: get(HeaderWord::DataBlockOffset)?,
            nav_block_offset: get(HeaderWord::NavBlockOffset)?,
            validation_code_length: validation_code_length(get(HeaderWord::ValidationCode)?),
            documentation_prefix_length: get(HeaderWord::DocumentationPrefixLength)?,
            calibration_prefix_length: get(HeaderWord::CalibrationPrefixLength)?,
            band_list_prefix_length: get(HeaderWord::BandListPrefixLength)?,
            source_type,
        };

        debug!(
            source = %session.source().describe(),
            num_rows = fields.num_rows,
            num_cols = fields.num_cols,
            bytes_per_point = fields.bytes_per_point,
            data_block_offset = fields.data_block_offset,
            nav_block_offset = fields.nav_block_offset,
            source_type = %fields.source_type,
            "Parsed AREA header"
        );

        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ByteOrder;
    use bytes::Bytes;
    use chrono::{Datelike, Timelike};

    fn header_bytes(words: &[(u64, i32)]) -> Bytes {
        let mut data = vec![0u8; 64 * 4];
        for &(index, value) in words {
            let at = index as usize * 4;
            data[at..at + 4].copy_from_slice(&value.to_be_bytes());
        }
        data[204..208].copy_from_slice(b"RADR");
        Bytes::from(data)
    }

    #[test]
    fn test_word_positions_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for word in HeaderWord::ALL {
            assert!(seen.insert(word.index()), "duplicate index for {:?}", word);
        }
        assert_eq!(HeaderWord::NumRows.byte_offset(), 32);
        assert_eq!(HeaderWord::DataBlockOffset.byte_offset(), 132);
    }

    #[test]
    fn test_all_is_in_discriminant_order() {
        for (i, word) in HeaderWord::ALL.iter().enumerate() {
            assert_eq!(*word as usize, i);
        }
    }

    #[test]
    fn test_decode_timestamp() {
        // 2020, day 290 (16 October), 13:45
        let ts = decode_timestamp(120_290, 134_512).unwrap();
        assert_eq!(ts.year(), 2020);
        assert_eq!(ts.month(), 10);
        assert_eq!(ts.day(), 16);
        assert_eq!(ts.hour(), 13);
        assert_eq!(ts.minute(), 45);
        assert_eq!(ts.second(), 0);
    }

    #[test]
    fn test_decode_timestamp_first_day() {
        let ts = decode_timestamp(99_001, 0).unwrap();
        assert_eq!(ts.year(), 1999);
        assert_eq!(ts.ordinal(), 1);
    }

    #[test]
    fn test_decode_timestamp_rejects_bad_hour() {
        assert!(decode_timestamp(120_001, 250_000).is_err());
        assert!(decode_timestamp(-1, 0).is_err());
    }

    #[test]
    fn test_validation_code_length() {
        assert_eq!(validation_code_length(0), 0);
        assert_eq!(validation_code_length(1), 4);
        assert_eq!(validation_code_length(-77), 4);
    }

    #[test]
    fn test_length_identities() {
        for (bands, cols, bpp, rows) in [(1, 400, 2, 300), (3, 17, 1, 5), (2, 1, 4, 1)] {
            for (doc, cal, band_list, val) in [(0, 0, 0, 0), (8, 0, 4, 4), (100, 32, 0, 0)] {
                let data = line_data_length(bands, cols, bpp);
                let prefix = line_prefix_length(doc, cal, band_list, val);
                let line = prefix + data;
                assert_eq!(data, (bands * cols * bpp) as i64);
                assert_eq!(data_block_length(rows, line), rows as i64 * line);
            }
        }
    }

    #[test]
    fn test_lengths_do_not_overflow_i32() {
        let data = line_data_length(4, 100_000, 10_000);
        assert_eq!(data, 4_000_000_000);
        assert_eq!(line_data_length(i32::MAX, i32::MAX, i32::MAX), i64::MAX);
        assert_eq!(data_block_length(i32::MIN, i64::MAX), i64::MIN);
    }

    #[test]
    fn test_word_is_cached_after_first_read() {
        let source = header_bytes(&[(8, 300), (9, 400)]);
        let model = HeaderModel::new();
        assert_eq!(model.cached(HeaderWord::NumRows), None);

        let mut session = ReadSession::new(&source, ByteOrder::BigEndian);
        assert_eq!(model.word(HeaderWord::NumRows, &mut session).unwrap(), 300);
        assert_eq!(model.cached(HeaderWord::NumRows), Some(300));

        // a fresh session over an empty source still answers from cache
        let empty = Bytes::new();
        let mut session = ReadSession::new(&empty, ByteOrder::BigEndian);
        assert_eq!(model.word(HeaderWord::NumRows, &mut session).unwrap(), 300);
        assert!(!session.is_open());
    }

    #[test]
    fn test_failed_read_leaves_field_uncomputed() {
        let short = Bytes::from(vec![0u8; 20]);
        let model = HeaderModel::new();
        let mut session = ReadSession::new(&short, ByteOrder::BigEndian);
        assert!(model.word(HeaderWord::NumRows, &mut session).is_err());
        assert_eq!(model.cached(HeaderWord::NumRows), None);
    }

    #[test]
    fn test_negative_value_is_cached_like_any_other() {
        let source = header_bytes(&[(5, -999)]);
        let model = HeaderModel::new();
        let mut session = ReadSession::new(&source, ByteOrder::BigEndian);
        assert_eq!(model.word(HeaderWord::UpperLeftRow, &mut session).unwrap(), -999);
        assert_eq!(model.cached(HeaderWord::UpperLeftRow), Some(-999));
    }

    #[test]
    fn test_fields_snapshot() {
        let source = header_bytes(&[
            (3, 120_290),
            (4, 134_500),
            (8, 2),
            (9, 3),
            (10, 2),
            (11, 1),
            (12, 2),
            (13, 1),
            (33, 512),
            (34, 256),
            (35, 1),
            (48, 8),
        ]);
        let model = HeaderModel::new();
        let mut session = ReadSession::new(&source, ByteOrder::BigEndian);
        let fields = model.fields(&mut session).unwrap();

        assert_eq!(fields.num_rows, 2);
        assert_eq!(fields.num_cols, 3);
        assert_eq!(fields.validation_code_length, 4);
        assert_eq!(fields.source_type, "RADR");
        assert_eq!(fields.line_data_length(), 6);
        assert_eq!(fields.line_prefix_length(), 12);
        assert_eq!(fields.line_length(), 18);
        assert_eq!(fields.data_block_length(), 36);
        assert_eq!(fields.image_resolution(), 2);
        assert_eq!(fields.creation_time.year(), 2020);
    }
}
