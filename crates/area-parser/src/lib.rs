//! Decoder for AREA radar composite files.
//!
//! An AREA file is a fixed-layout binary image: a directory of 4-byte
//! header words, a navigation sub-block describing the polar/Lambert grid,
//! and a data block of 2-byte "semi-float" samples.
//!
//! ```no_run
//! use area_parser::{AreaFile, ByteOrder};
//!
//! # fn main() -> area_parser::AreaResult<()> {
//! let area = AreaFile::open("AREA0001", ByteOrder::BigEndian);
//! let grid = area.decode()?;
//! let (x, y) = area.grid_to_geo(1, 1)?;
//! println!("{}x{} grid, first cell at ({}, {})", grid.rows(), grid.cols(), x, y);
//! # Ok(())
//! # }
//! ```

pub mod angle;
pub mod area;
pub mod config;
pub mod decoder;
pub mod header;
pub mod magnitude;
pub mod navigation;
pub mod reader;
pub mod transform;

pub use angle::decode_angle;
pub use area::AreaFile;
pub use config::DecoderConfig;
pub use decoder::{GridDecoder, GridLayout, LineLayout};
pub use header::{HeaderFields, HeaderModel, HeaderWord};
pub use magnitude::{decode_magnitude, decode_sample};
pub use navigation::{NavigationFields, NavigationModel};
pub use reader::{ByteOrder, ByteSource, ReadSession, WordReader};
pub use transform::CoordinateTransformer;

pub use area_common::{AreaError, AreaResult, BoundingBox, DataGrid, GeoTransform, NULL_VALUE};
