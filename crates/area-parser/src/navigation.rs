//! Navigation sub-block: pole location, standard parallels, grid spacing.

use std::cell::OnceCell;

use area_common::AreaResult;
use serde::Serialize;
use tracing::debug;

use crate::angle::decode_angle;
use crate::header::{HeaderModel, HeaderWord};
use crate::reader::{checked_offset, ByteSource, ReadSession};

/// Offsets relative to the start of the navigation block.
pub mod offsets {
    pub const PROJECTION_TYPE: u64 = 0;
    pub const POLE_ROW: u64 = 4;
    pub const POLE_COL: u64 = 8;
    pub const LAMBERT_LAT1: u64 = 12;
    pub const LAMBERT_LAT2: u64 = 16;
    pub const GRID_SPACING: u64 = 20;
    pub const POLE_LONGITUDE: u64 = 24;
    pub const POLE_LATITUDE: u64 = 36;
}

/// Packed pole latitude assumed when the field is zero (90°N).
pub const DEFAULT_POLE_LATITUDE: i32 = 900_000;

/// Decoded navigation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NavigationFields {
    pub pole_row: i32,
    pub pole_col: i32,
    pub pole_latitude: f64,
    pub pole_longitude: f64,
    pub lambert_lat1: f64,
    pub lambert_lat2: f64,
    pub grid_spacing_km: f64,
}

/// Decode the pole longitude; a non-negative hemisphere flag means west.
pub fn pole_longitude(raw: i32, hemisphere_flag: i32) -> f64 {
    let lon = decode_angle(raw);
    if hemisphere_flag >= 0 {
        -lon
    } else {
        lon
    }
}

/// Decode the pole latitude, substituting the north pole for zero.
pub fn pole_latitude(raw: i32) -> f64 {
    if raw == 0 {
        decode_angle(DEFAULT_POLE_LATITUDE)
    } else {
        decode_angle(raw)
    }
}

/// Grid spacing in kilometres from the raw word (metres).
pub fn grid_spacing_km(raw: i32) -> f64 {
    raw as f64 / 1000.0
}

/// Lazily read navigation fields.
///
/// The numeric fields are read as a group and cached together, so either
/// all of them are available or none are.
#[derive(Debug, Default)]
pub struct NavigationModel {
    fields: OnceCell<NavigationFields>,
    projection_type: OnceCell<String>,
}

impl NavigationModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self) -> Option<&NavigationFields> {
        self.fields.get()
    }

    fn block_offset<S: ByteSource>(
        header: &HeaderModel,
        session: &mut ReadSession<'_, S>,
    ) -> AreaResult<u64> {
        let raw = header.word(HeaderWord::NavBlockOffset, session)?;
        checked_offset(HeaderWord::NavBlockOffset.name(), raw)
    }

    /// Read (or return cached) navigation fields.
    pub fn fields<S: ByteSource>(
        &self,
        header: &HeaderModel,
        session: &mut ReadSession<'_, S>,
    ) -> AreaResult<NavigationFields> {
        if let Some(fields) = self.fields.get() {
            return Ok(*fields);
        }

        let base = Self::block_offset(header, session)?;
        let hemisphere = header.word(HeaderWord::HemisphereFlag, session)?;

        let reader = session.reader()?;
        let pole_row = reader.read_i32_at(base + offsets::POLE_ROW, "pole_row")?;
        let pole_col = reader.read_i32_at(base + offsets::POLE_COL, "pole_col")?;
        let lat1 = reader.read_i32_at(base + offsets::LAMBERT_LAT1, "lambert_lat1")?;
        let lat2 = reader.read_i32_at(base + offsets::LAMBERT_LAT2, "lambert_lat2")?;
        let spacing = reader.read_i32_at(base + offsets::GRID_SPACING, "grid_spacing")?;
        let lon = reader.read_i32_at(base + offsets::POLE_LONGITUDE, "pole_longitude")?;
        let lat = reader.read_i32_at(base + offsets::POLE_LATITUDE, "pole_latitude")?;

        let fields = NavigationFields {
            pole_row,
            pole_col,
            pole_latitude: pole_latitude(lat),
            pole_longitude: pole_longitude(lon, hemisphere),
            lambert_lat1: decode_angle(lat1),
            lambert_lat2: decode_angle(lat2),
            grid_spacing_km: grid_spacing_km(spacing),
        };

        debug!(
            source = %session.source().describe(),
            nav_block_offset = base,
            pole_row = fields.pole_row,
            pole_col = fields.pole_col,
            pole_latitude = fields.pole_latitude,
            pole_longitude = fields.pole_longitude,
            grid_spacing_km = fields.grid_spacing_km,
            "Parsed AREA navigation block"
        );

        let _ = self.fields.set(fields);
        Ok(fields)
    }

    /// Four-character projection tag, e.g. `LAMB` or `PS  `.
    pub fn projection_type<S: ByteSource>(
        &self,
        header: &HeaderModel,
        session: &mut ReadSession<'_, S>,
    ) -> AreaResult<String> {
        if let Some(value) = self.projection_type.get() {
            return Ok(value.clone());
        }
        let base = Self::block_offset(header, session)?;
        let value = session.reader()?.read_ascii_at(
            base + offsets::PROJECTION_TYPE,
            4,
            "projection_type",
        )?;
        let _ = self.projection_type.set(value.clone());
        Ok(value)
    }
}
