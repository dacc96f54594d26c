//! Common types shared by the AREA decoder crates.

pub mod bbox;
pub mod error;
pub mod grid;

pub use bbox::BoundingBox;
pub use error::{AreaError, AreaResult};
pub use grid::{DataGrid, GeoTransform, NULL_VALUE};
