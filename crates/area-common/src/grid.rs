//! Decoded data grids and their georeferencing.

use crate::BoundingBox;
use serde::{Deserialize, Serialize};

/// Value stored in cells whose encoded sample is the all-ones null pattern.
pub const NULL_VALUE: f32 = -9999.0;

/// Dense row-major grid of physical values, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct DataGrid {
    rows: usize,
    cols: usize,
    values: Vec<f32>,
}

impl DataGrid {
    /// Wrap row-major values. Returns `None` if the length does not match.
    pub fn from_values(rows: usize, cols: usize, values: Vec<f32>) -> Option<Self> {
        if values.len() != rows * cols {
            return None;
        }
        Some(Self { rows, cols, values })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if grid is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a 0-based (row, col), or `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.values[row * self.cols + col])
    }

    /// A full row as a slice.
    pub fn row(&self, row: usize) -> Option<&[f32]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(&self.values[start..start + self.cols])
    }

    /// All values in row-major order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    /// True if the value is the null sentinel.
    pub fn is_null(value: f32) -> bool {
        value == NULL_VALUE
    }

    /// Number of cells holding the null sentinel.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|&&v| Self::is_null(v)).count()
    }

    /// Minimum and maximum over non-null cells.
    pub fn valid_range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|&v| !Self::is_null(v))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Affine georeferencing in GDAL coefficient order.
///
/// `x = top_left_x + col * pixel_width + row * rotation_x`
/// `y = top_left_y + col * rotation_y + row * pixel_height`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform with no rotation terms.
    pub fn north_up(top_left_x: f64, top_left_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            top_left_x,
            pixel_width,
            rotation_x: 0.0,
            top_left_y,
            rotation_y: 0.0,
            pixel_height,
        }
    }

    /// The six coefficients as GDAL's `SetGeoTransform` expects them.
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    /// Projected coordinate of a 0-based pixel position.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.top_left_x + col * self.pixel_width + row * self.rotation_x,
            self.top_left_y + col * self.rotation_y + row * self.pixel_height,
        )
    }

    /// Extent covered by a grid of the given size.
    pub fn extent(&self, rows: usize, cols: usize) -> BoundingBox {
        let origin = self.apply(0.0, 0.0);
        let far = self.apply(cols as f64, rows as f64);
        BoundingBox::from_corners(origin, far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> DataGrid {
        DataGrid::from_values(2, 3, vec![1.0, NULL_VALUE, 3.0, 4.0, 5.0, NULL_VALUE]).unwrap()
    }

    #[test]
    fn test_from_values_rejects_wrong_length() {
        assert!(DataGrid::from_values(2, 2, vec![0.0; 3]).is_none());
    }

    #[test]
    fn test_get_and_row() {
        let grid = sample_grid();
        assert_eq!(grid.get(0, 0), Some(1.0));
        assert_eq!(grid.get(1, 1), Some(5.0));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 3), None);
        assert_eq!(grid.row(1), Some(&[4.0, 5.0, NULL_VALUE][..]));
        assert!(grid.row(2).is_none());
    }

    #[test]
    fn test_null_accounting() {
        let grid = sample_grid();
        assert_eq!(grid.null_count(), 2);
        assert_eq!(grid.valid_range(), Some((1.0, 5.0)));
    }

    #[test]
    fn test_valid_range_all_null() {
        let grid = DataGrid::from_values(1, 2, vec![NULL_VALUE, NULL_VALUE]).unwrap();
        assert_eq!(grid.valid_range(), None);
    }

    #[test]
    fn test_geotransform_extent() {
        let gt = GeoTransform::north_up(-1000.0, 2000.0, 500.0, -500.0);
        assert_eq!(gt.to_gdal(), [-1000.0, 500.0, 0.0, 2000.0, 0.0, -500.0]);

        let extent = gt.extent(4, 6);
        assert_eq!(extent.min_x, -1000.0);
        assert_eq!(extent.max_x, 2000.0);
        assert_eq!(extent.min_y, 0.0);
        assert_eq!(extent.max_y, 2000.0);
    }
}
