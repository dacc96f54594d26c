//! Data block decoding.

use std::io::{Read, Seek};
use std::time::Instant;

use area_common::{AreaError, AreaResult, DataGrid};
use tracing::{info, warn};

use crate::header::{HeaderModel, HeaderWord};
use crate::magnitude::decode_sample;
use crate::reader::{checked_offset, ByteSource, ReadSession, WordReader};

/// Bytes per encoded sample.
pub const SAMPLE_BYTES: usize = 2;

/// How rows are laid out inside the data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineLayout {
    /// `rows × cols` samples back to back from the data block offset.
    Flat,
    /// Each row starts `line_length` bytes after the previous one and its
    /// samples follow `prefix_length` bytes of per-line prefix.
    Prefixed { prefix_length: u64, line_length: u64 },
}

/// Where the samples are and how many there are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub data_offset: u64,
    pub rows: usize,
    pub cols: usize,
    pub lines: LineLayout,
}

fn dimension(word: HeaderWord, value: i32) -> AreaResult<usize> {
    usize::try_from(value)
        .map_err(|_| AreaError::invalid_field(word.name(), value as i64, "dimension must not be negative"))
}

fn length(field: &'static str, value: i64) -> AreaResult<u64> {
    u64::try_from(value)
        .map_err(|_| AreaError::invalid_field(field, value, "length must not be negative"))
}

impl GridLayout {
    /// A flat layout from the raw dimension and data offset words.
    pub fn from_words(num_rows: i32, num_cols: i32, data_block_offset: i32) -> AreaResult<Self> {
        let rows = dimension(HeaderWord::NumRows, num_rows)?;
        let cols = dimension(HeaderWord::NumCols, num_cols)?;
        let data_offset = checked_offset(HeaderWord::DataBlockOffset.name(), data_block_offset)?;

        let addressable = rows
            .checked_mul(cols)
            .and_then(|cells| cells.checked_mul(SAMPLE_BYTES))
            .is_some();
        if !addressable {
            return Err(AreaError::invalid_field(
                HeaderWord::NumCols.name(),
                num_cols as i64,
                format!("{} rows of {} columns overflows the address space", rows, cols),
            ));
        }

        if rows == 0 || cols == 0 {
            warn!(rows, cols, "AREA header describes an empty grid");
        }

        Ok(Self {
            data_offset,
            rows,
            cols,
            lines: LineLayout::Flat,
        })
    }

    /// Switch to one row per `line_length` bytes, samples after the prefix.
    pub fn with_prefixes(self, prefix_length: i64, line_length: i64) -> AreaResult<Self> {
        Ok(Self {
            lines: LineLayout::Prefixed {
                prefix_length: length("line_prefix_length", prefix_length)?,
                line_length: length("line_length", line_length)?,
            },
            ..self
        })
    }

    /// Read the layout through the header cache.
    ///
    /// Only the dimensions and the data block offset are read, plus the
    /// prefix words when prefixes are skipped.
    pub fn read<S: ByteSource>(
        header: &HeaderModel,
        session: &mut ReadSession<'_, S>,
        skip_line_prefixes: bool,
    ) -> AreaResult<Self> {
        let layout = Self::from_words(
            header.word(HeaderWord::NumRows, session)?,
            header.word(HeaderWord::NumCols, session)?,
            header.word(HeaderWord::DataBlockOffset, session)?,
        )?;
        if skip_line_prefixes {
            layout.with_prefixes(
                header.line_prefix_length(session)?,
                header.line_length(session)?,
            )
        } else {
            Ok(layout)
        }
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Bytes of samples in one row.
    pub fn row_bytes(&self) -> usize {
        self.cols * SAMPLE_BYTES
    }

    /// Byte offset of the first sample of a 0-based row.
    pub fn row_offset(&self, row: usize) -> u64 {
        match self.lines {
            LineLayout::Flat => self
                .data_offset
                .saturating_add(row as u64 * self.row_bytes() as u64),
            LineLayout::Prefixed {
                prefix_length,
                line_length,
            } => self
                .data_offset
                .saturating_add((row as u64).saturating_mul(line_length))
                .saturating_add(prefix_length),
        }
    }

    /// Offset one past the last byte the decoder reads.
    pub fn end_offset(&self) -> u64 {
        match self.rows.checked_sub(1) {
            Some(last) => self
                .row_offset(last)
                .saturating_add(self.row_bytes() as u64),
            None => self.data_offset,
        }
    }

    /// Strict checks against the header and the resource size.
    pub fn validate<S: ByteSource>(
        &self,
        header: &HeaderModel,
        session: &mut ReadSession<'_, S>,
        resource_len: u64,
    ) -> AreaResult<()> {
        if self.rows == 0 {
            return Err(AreaError::invalid_field(HeaderWord::NumRows.name(), 0, "must be positive"));
        }
        if self.cols == 0 {
            return Err(AreaError::invalid_field(HeaderWord::NumCols.name(), 0, "must be positive"));
        }
        let nav_block_offset = header.word(HeaderWord::NavBlockOffset, session)?;
        checked_offset(HeaderWord::NavBlockOffset.name(), nav_block_offset)?;

        if let LineLayout::Prefixed { .. } = self.lines {
            let bytes_per_point = header.word(HeaderWord::BytesPerPoint, session)?;
            if bytes_per_point != SAMPLE_BYTES as i32 {
                return Err(AreaError::UnsupportedLayout(format!(
                    "{} bytes per point, only {} is decoded",
                    bytes_per_point, SAMPLE_BYTES
                )));
            }
            let num_bands = header.word(HeaderWord::NumBands, session)?;
            if num_bands != 1 {
                return Err(AreaError::UnsupportedLayout(format!(
                    "{} bands, only single-band images are decoded",
                    num_bands
                )));
            }
        }

        let end = self.end_offset();
        if end > resource_len {
            return Err(AreaError::invalid_header(format!(
                "data block runs to byte {} but the resource is {} bytes",
                end, resource_len
            )));
        }
        Ok(())
    }
}

/// Reads the data block into a [`DataGrid`].
#[derive(Debug, Clone, Copy)]
pub struct GridDecoder {
    layout: GridLayout,
}

impl GridDecoder {
    pub fn new(layout: GridLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Decode every sample. On any read failure nothing is returned.
    ///
    /// The layout is checked against the stream length before any buffer
    /// is sized from it.
    pub fn decode<R: Read + Seek>(&self, reader: &mut WordReader<R>) -> AreaResult<DataGrid> {
        let start = Instant::now();
        let layout = &self.layout;
        let byte_order = reader.byte_order();

        if layout.cell_count() > 0 {
            let available = reader.stream_len()?;
            let end = layout.end_offset();
            if end > available {
                return Err(AreaError::ShortRead {
                    what: "data block".to_string(),
                    offset: layout.data_offset,
                    expected: usize::try_from(end - layout.data_offset).unwrap_or(usize::MAX),
                    found: usize::try_from(available.saturating_sub(layout.data_offset))
                        .unwrap_or(usize::MAX),
                });
            }
        }

        let mut values = Vec::with_capacity(layout.cell_count());
        let mut line = vec![0u8; layout.row_bytes()];

        if layout.lines == LineLayout::Flat {
            reader.seek_to(layout.data_offset)?;
        }
        for row in 0..layout.rows {
            if let LineLayout::Prefixed { .. } = layout.lines {
                reader.seek_to(layout.row_offset(row))?;
            }
            reader.read_bytes(&mut line, "data block row")?;
            values.extend(
                line.chunks_exact(SAMPLE_BYTES)
                    .map(|pair| decode_sample([pair[0], pair[1]], byte_order)),
            );
        }

        let grid = DataGrid::from_values(layout.rows, layout.cols, values).ok_or_else(|| {
            AreaError::UnsupportedLayout("decoded sample count does not match grid size".into())
        })?;

        info!(
            rows = grid.rows(),
            cols = grid.cols(),
            null_cells = grid.null_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Decoded AREA data block"
        );

        Ok(grid)
    }
}
