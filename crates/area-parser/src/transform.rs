//! Grid ↔ projected coordinate conversion.
//!
//! Rows and columns are 1-based image coordinates. Projected coordinates are
//! metres in the product's polar/Lambert plane, with the pole at the origin,
//! x growing east and y growing north.

use area_common::{AreaResult, BoundingBox, GeoTransform};
use serde::Serialize;

use crate::header::{HeaderFields, HeaderModel, HeaderWord};
use crate::navigation::NavigationFields;
use crate::reader::{ByteSource, ReadSession};

/// Parameters shared by both conversions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoordinateTransformer {
    pub pole_row: i32,
    pub pole_col: i32,
    pub grid_spacing_km: f64,
    pub upper_left_row: i32,
    pub upper_left_col: i32,
    pub row_resolution: i32,
    pub col_resolution: i32,
    pub num_rows: i32,
    pub num_cols: i32,
}

impl CoordinateTransformer {
    pub fn new(header: &HeaderFields, navigation: &NavigationFields) -> Self {
        Self {
            pole_row: navigation.pole_row,
            pole_col: navigation.pole_col,
            grid_spacing_km: navigation.grid_spacing_km,
            upper_left_row: header.upper_left_row,
            upper_left_col: header.upper_left_col,
            row_resolution: header.row_resolution,
            col_resolution: header.col_resolution,
            num_rows: header.num_rows,
            num_cols: header.num_cols,
        }
    }

    /// Read just the header words the conversions use.
    ///
    /// Timestamps, source type and prefix words are never touched, so a
    /// garbled field elsewhere in the directory does not stop
    /// georeferencing.
    pub fn read<S: ByteSource>(
        header: &HeaderModel,
        navigation: &NavigationFields,
        session: &mut ReadSession<'_, S>,
    ) -> AreaResult<Self> {
        Ok(Self {
            pole_row: navigation.pole_row,
            pole_col: navigation.pole_col,
            grid_spacing_km: navigation.grid_spacing_km,
            upper_left_row: header.word(HeaderWord::UpperLeftRow, session)?,
            upper_left_col: header.word(HeaderWord::UpperLeftCol, session)?,
            row_resolution: header.word(HeaderWord::RowResolution, session)?,
            col_resolution: header.word(HeaderWord::ColResolution, session)?,
            num_rows: header.word(HeaderWord::NumRows, session)?,
            num_cols: header.word(HeaderWord::NumCols, session)?,
        })
    }

    fn metres_per_unit(&self) -> f64 {
        self.grid_spacing_km * 1000.0
    }

    /// Projected (x, y) in metres of a 1-based (row, col).
    pub fn grid_to_geo(&self, row: i32, col: i32) -> (f64, f64) {
        let scale = self.metres_per_unit();
        let image_col = self.upper_left_col as f64
            + (col as f64 - 1.0) * self.col_resolution as f64
            - self.pole_col as f64;
        let image_row = self.upper_left_row as f64
            + (row as f64 - 1.0) * self.row_resolution as f64
            - self.pole_row as f64;
        (image_col * scale, -image_row * scale)
    }

    /// Nearest 1-based (row, col) of a projected point.
    ///
    /// Halfway cases round to the even integer. Points off the grid map to
    /// rows/columns outside `1..=num_rows`/`1..=num_cols`; they are not
    /// clamped.
    pub fn geo_to_grid(&self, x: f64, y: f64) -> (i32, i32) {
        let scale = self.metres_per_unit();
        let col_res = self.col_resolution as f64;
        let row_res = self.row_resolution as f64;

        let col = (x / scale - self.upper_left_col as f64 + self.pole_col as f64 + col_res)
            / col_res;
        let row = (self.pole_row as f64 - self.upper_left_row as f64 - y / scale + row_res)
            / row_res;

        (row.round_ties_even() as i32, col.round_ties_even() as i32)
    }

    /// Size of one cell in metres as (width, height); height is negative
    /// because rows grow southward.
    pub fn cell_size(&self) -> (f64, f64) {
        let scale = self.metres_per_unit();
        (
            self.col_resolution as f64 * scale,
            -(self.row_resolution as f64) * scale,
        )
    }

    /// Affine transform whose pixel (0, 0) corner is the outer corner of the
    /// first cell; cell centres fall on `grid_to_geo`.
    pub fn geo_transform(&self) -> GeoTransform {
        let (center_x, center_y) = self.grid_to_geo(1, 1);
        let (width, height) = self.cell_size();
        GeoTransform::north_up(
            center_x - width / 2.0,
            center_y - height / 2.0,
            width,
            height,
        )
    }

    /// Projected extent of the whole grid, cell edges included.
    pub fn bounds(&self) -> BoundingBox {
        self.geo_transform()
            .extent(self.num_rows.max(0) as usize, self.num_cols.max(0) as usize)
    }

    pub fn contains(&self, row: i32, col: i32) -> bool {
        (1..=self.num_rows).contains(&row) && (1..=self.num_cols).contains(&col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transformer(resolution: i32, spacing: f64) -> CoordinateTransformer {
        CoordinateTransformer {
            pole_row: 1200,
            pole_col: -300,
            grid_spacing_km: spacing,
            upper_left_row: 100,
            upper_left_col: 200,
            row_resolution: resolution,
            col_resolution: resolution,
            num_rows: 50,
            num_cols: 80,
        }
    }

    #[test]
    fn test_grid_to_geo_formula() {
        let t = transformer(1, 4.0);
        // (200 + 0 + 300) * 4000, -(100 + 0 - 1200) * 4000
        assert_eq!(t.grid_to_geo(1, 1), (2_000_000.0, 4_400_000.0));
        assert_eq!(t.grid_to_geo(2, 3), (2_008_000.0, 4_396_000.0));
    }

    #[test]
    fn test_pole_maps_to_origin() {
        let t = CoordinateTransformer {
            upper_left_row: 1,
            upper_left_col: 1,
            pole_row: 10,
            pole_col: 20,
            ..transformer(1, 2.0)
        };
        assert_eq!(t.grid_to_geo(10, 20), (0.0, 0.0));
        assert_eq!(t.geo_to_grid(0.0, 0.0), (10, 20));
    }

    #[test]
    fn test_round_trip_interior_cells() {
        for (resolution, spacing) in [(1, 4.0), (2, 1.5), (3, 0.25)] {
            let t = transformer(resolution, spacing);
            for row in 1..=t.num_rows {
                for col in 1..=t.num_cols {
                    let (x, y) = t.grid_to_geo(row, col);
                    assert_eq!(t.geo_to_grid(x, y), (row, col), "res {}", resolution);
                }
            }
        }
    }

    #[test]
    fn test_points_inside_cell_snap_to_it() {
        let t = transformer(1, 4.0);
        let (x, y) = t.grid_to_geo(10, 10);
        assert_eq!(t.geo_to_grid(x + 1_500.0, y - 1_500.0), (10, 10));
        assert_eq!(t.geo_to_grid(x - 1_900.0, y + 1_900.0), (10, 10));
        assert_eq!(t.geo_to_grid(x + 2_100.0, y), (10, 11));
    }

    #[test]
    fn test_halfway_rounds_to_even() {
        let t = transformer(1, 4.0);
        let (x, y) = t.grid_to_geo(10, 10);
        // exactly half a cell east: 10.5 -> 10
        assert_eq!(t.geo_to_grid(x + 2_000.0, y).1, 10);
        // exactly half a cell east of column 11: 11.5 -> 12
        assert_eq!(t.geo_to_grid(x + 6_000.0, y).1, 12);
    }

    #[test]
    fn test_geo_transform_centres_on_cells() {
        let t = transformer(2, 1.5);
        let gt = t.geo_transform();
        assert_eq!(gt.pixel_width, 3_000.0);
        assert_eq!(gt.pixel_height, -3_000.0);

        for (row, col) in [(1, 1), (5, 7), (50, 80)] {
            let centre = gt.apply(col as f64 - 0.5, row as f64 - 0.5);
            assert_eq!(centre, t.grid_to_geo(row, col));
        }
    }

    #[test]
    fn test_bounds() {
        let t = transformer(1, 4.0);
        let bounds = t.bounds();
        assert_eq!(bounds.width(), 80.0 * 4_000.0);
        assert_eq!(bounds.height(), 50.0 * 4_000.0);
        let (x, y) = t.grid_to_geo(1, 1);
        assert!(bounds.contains_point(x, y));
        let (x, y) = t.grid_to_geo(50, 80);
        assert!(bounds.contains_point(x, y));
    }

    #[test]
    fn test_read_skips_unrelated_header_words() {
        use crate::reader::ByteOrder;

        let mut data = vec![0u8; 64 * 4];
        for (word, value) in [
            (HeaderWord::CreationTime, 250_000i32),
            (HeaderWord::UpperLeftRow, 100),
            (HeaderWord::UpperLeftCol, 200),
            (HeaderWord::NumRows, 50),
            (HeaderWord::NumCols, 80),
            (HeaderWord::RowResolution, 1),
            (HeaderWord::ColResolution, 1),
        ] {
            let at = word.byte_offset() as usize;
            data[at..at + 4].copy_from_slice(&value.to_be_bytes());
        }
        let source = bytes::Bytes::from(data);
        let navigation = NavigationFields {
            pole_row: 1200,
            pole_col: -300,
            pole_latitude: 90.0,
            pole_longitude: -95.0,
            lambert_lat1: 25.0,
            lambert_lat2: 25.0,
            grid_spacing_km: 4.0,
        };
        let header = HeaderModel::new();
        let mut session = ReadSession::new(&source, ByteOrder::BigEndian);

        let t = CoordinateTransformer::read(&header, &navigation, &mut session).unwrap();
        assert_eq!(t, transformer(1, 4.0));
        assert_eq!(header.cached(HeaderWord::CreationTime), None);
    }

    #[test]
    fn test_contains() {
        let t = transformer(1, 4.0);
        assert!(t.contains(1, 1));
        assert!(t.contains(50, 80));
        assert!(!t.contains(0, 1));
        assert!(!t.contains(51, 1));
    }
}
