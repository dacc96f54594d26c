//! The AREA file handle.

use std::path::{Path, PathBuf};

use area_common::{AreaResult, BoundingBox, DataGrid, GeoTransform};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::DecoderConfig;
use crate::decoder::{GridDecoder, GridLayout};
use crate::header::{HeaderFields, HeaderModel, HeaderWord};
use crate::navigation::{NavigationFields, NavigationModel};
use crate::reader::{ByteOrder, ByteSource, ReadSession};
use crate::transform::CoordinateTransformer;

/// An AREA resource plus lazily populated header and navigation caches.
///
/// Nothing is read until a field is asked for. Each accessor opens the
/// resource for the duration of one call; [`AreaFile::header`] and
/// [`AreaFile::decode`] read everything they need through one handle.
///
/// The caches are not synchronized, so an `AreaFile` is `Send` but not
/// `Sync`.
#[derive(Debug)]
pub struct AreaFile<S: ByteSource = PathBuf> {
    source: S,
    config: DecoderConfig,
    header: HeaderModel,
    navigation: NavigationModel,
}

impl AreaFile<PathBuf> {
    /// Open a file on disk. No bytes are read yet.
    pub fn open(path: impl AsRef<Path>, byte_order: ByteOrder) -> Self {
        Self::open_with_config(path, DecoderConfig::new(byte_order))
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: DecoderConfig) -> Self {
        Self::with_source(path.as_ref().to_path_buf(), config)
    }

    pub fn path(&self) -> &Path {
        &self.source
    }
}

impl AreaFile<Bytes> {
    /// Wrap an in-memory copy of an AREA file.
    pub fn from_bytes(data: impl Into<Bytes>, byte_order: ByteOrder) -> Self {
        Self::with_source(data.into(), DecoderConfig::new(byte_order))
    }
}

impl<S: ByteSource> AreaFile<S> {
    pub fn with_source(source: S, config: DecoderConfig) -> Self {
        Self {
            source,
            config,
            header: HeaderModel::new(),
            navigation: NavigationModel::new(),
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.config.byte_order
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn session(&self) -> ReadSession<'_, S> {
        ReadSession::new(&self.source, self.config.byte_order)
    }

    fn word(&self, word: HeaderWord) -> AreaResult<i32> {
        self.header.word(word, &mut self.session())
    }

    // === Header fields ===

    pub fn hemisphere_flag(&self) -> AreaResult<i32> {
        self.word(HeaderWord::HemisphereFlag)
    }

    pub fn upper_left_row(&self) -> AreaResult<i32> {
        self.word(HeaderWord::UpperLeftRow)
    }

    pub fn upper_left_col(&self) -> AreaResult<i32> {
        self.word(HeaderWord::UpperLeftCol)
    }

    pub fn num_rows(&self) -> AreaResult<i32> {
        self.word(HeaderWord::NumRows)
    }

    pub fn num_cols(&self) -> AreaResult<i32> {
        self.word(HeaderWord::NumCols)
    }

    pub fn bytes_per_point(&self) -> AreaResult<i32> {
        self.word(HeaderWord::BytesPerPoint)
    }

    pub fn row_resolution(&self) -> AreaResult<i32> {
        self.word(HeaderWord::RowResolution)
    }

    pub fn col_resolution(&self) -> AreaResult<i32> {
        self.word(HeaderWord::ColResolution)
    }

    pub fn num_bands(&self) -> AreaResult<i32> {
        self.word(HeaderWord::NumBands)
    }

    pub fn data_block_offset(&self) -> AreaResult<i32> {
        self.word(HeaderWord::DataBlockOffset)
    }

    pub fn nav_block_offset(&self) -> AreaResult<i32> {
        self.word(HeaderWord::NavBlockOffset)
    }

    pub fn validation_code_length(&self) -> AreaResult<i32> {
        self.header.validation_code_length(&mut self.session())
    }

    pub fn documentation_prefix_length(&self) -> AreaResult<i32> {
        self.word(HeaderWord::DocumentationPrefixLength)
    }

    pub fn calibration_prefix_length(&self) -> AreaResult<i32> {
        self.word(HeaderWord::CalibrationPrefixLength)
    }

    pub fn band_list_prefix_length(&self) -> AreaResult<i32> {
        self.word(HeaderWord::BandListPrefixLength)
    }

    pub fn source_type(&self) -> AreaResult<String> {
        self.header.source_type(&mut self.session())
    }

    pub fn creation_time(&self) -> AreaResult<DateTime<Utc>> {
        self.header.creation_time(&mut self.session())
    }

    /// Column resolution × row resolution.
    pub fn image_resolution(&self) -> AreaResult<i64> {
        let mut session = self.session();
        let col = self.header.word(HeaderWord::ColResolution, &mut session)?;
        let row = self.header.word(HeaderWord::RowResolution, &mut session)?;
        Ok(col as i64 * row as i64)
    }

    // === Derived lengths ===

    pub fn line_data_length(&self) -> AreaResult<i64> {
        self.header.line_data_length(&mut self.session())
    }

    pub fn line_prefix_length(&self) -> AreaResult<i64> {
        self.header.line_prefix_length(&mut self.session())
    }

    pub fn line_length(&self) -> AreaResult<i64> {
        self.header.line_length(&mut self.session())
    }

    pub fn data_block_length(&self) -> AreaResult<i64> {
        self.header.data_block_length(&mut self.session())
    }

    /// Every header field, read through a single handle.
    pub fn header(&self) -> AreaResult<HeaderFields> {
        self.header.fields(&mut self.session())
    }

    // === Navigation ===

    pub fn navigation(&self) -> AreaResult<NavigationFields> {
        self.navigation.fields(&self.header, &mut self.session())
    }

    pub fn projection_type(&self) -> AreaResult<String> {
        self.navigation
            .projection_type(&self.header, &mut self.session())
    }

    pub fn pole_row(&self) -> AreaResult<i32> {
        Ok(self.navigation()?.pole_row)
    }

    pub fn pole_col(&self) -> AreaResult<i32> {
        Ok(self.navigation()?.pole_col)
    }

    /// Pole (latitude, longitude) in degrees.
    pub fn pole_lat_lon(&self) -> AreaResult<(f64, f64)> {
        let nav = self.navigation()?;
        Ok((nav.pole_latitude, nav.pole_longitude))
    }

    /// Lambert conformal standard parallels in degrees.
    pub fn lambert_parallels(&self) -> AreaResult<(f64, f64)> {
        let nav = self.navigation()?;
        Ok((nav.lambert_lat1, nav.lambert_lat2))
    }

    pub fn grid_spacing_km(&self) -> AreaResult<f64> {
        Ok(self.navigation()?.grid_spacing_km)
    }

    // === Georeferencing ===

    pub fn transformer(&self) -> AreaResult<CoordinateTransformer> {
        let mut session = self.session();
        let navigation = self.navigation.fields(&self.header, &mut session)?;
        CoordinateTransformer::read(&self.header, &navigation, &mut session)
    }

    /// Projected (x, y) in metres of a 1-based (row, col).
    pub fn grid_to_geo(&self, row: i32, col: i32) -> AreaResult<(f64, f64)> {
        Ok(self.transformer()?.grid_to_geo(row, col))
    }

    /// Nearest 1-based (row, col) of a projected point in metres.
    pub fn geo_to_grid(&self, x: f64, y: f64) -> AreaResult<(i32, i32)> {
        Ok(self.transformer()?.geo_to_grid(x, y))
    }

    pub fn geo_transform(&self) -> AreaResult<GeoTransform> {
        Ok(self.transformer()?.geo_transform())
    }

    pub fn bounds(&self) -> AreaResult<BoundingBox> {
        Ok(self.transformer()?.bounds())
    }

    // === Data ===

    /// Decode the data block into a grid of physical values.
    ///
    /// Only the words that size and locate the grid are read, so other
    /// header fields may be malformed.
    pub fn decode(&self) -> AreaResult<DataGrid> {
        let mut session = self.session();
        let layout = GridLayout::read(&self.header, &mut session, self.config.skip_line_prefixes)?;

        if self.config.strict {
            layout.validate(&self.header, &mut session, self.source.byte_len()?)?;
        }

        debug!(
            source = %self.source.describe(),
            byte_order = %self.config.byte_order,
            layout = ?layout.lines,
            "Decoding AREA data block"
        );

        GridDecoder::new(layout).decode(session.reader()?)
    }
}
