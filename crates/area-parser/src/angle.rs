//! Packed degree/minute/second angles.
//!
//! Navigation angles are stored as signed integers of the form `DDDMMSS`
//! (degrees × 10000 + minutes × 100 + seconds), e.g. `403015` is
//! 40°30'15". The sign applies to the whole angle.

/// Decode a packed `DDDMMSS` angle into signed decimal degrees.
///
/// The whole-degree and minute parts are truncated by integer division of
/// the magnitude, never rounded. Readers that round `raw / 10000` to get
/// the degrees come out one degree higher once the minutes reach 30:
/// `403000` is 40.5 here and 41.5 there.
///
/// No range checking is done; out-of-range packed values decode to
/// out-of-range angles.
pub fn decode_angle(raw: i32) -> f64 {
    // i64 so that i32::MIN has a magnitude
    let v = (raw as i64).abs();

    let degrees = (v / 10_000) as f64;
    let minutes = ((v / 100) % 100) as f64 / 60.0;
    let seconds = (v % 100) as f64 / 3600.0;

    let magnitude = degrees + minutes + seconds;
    if raw < 0 {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(decode_angle(0), 0.0);
    }

    #[test]
    fn test_default_pole_latitude() {
        assert_eq!(decode_angle(900_000), 90.0);
    }

    #[test]
    fn test_minutes_and_seconds() {
        // 40°30'00"
        assert_eq!(decode_angle(403_000), 40.5);
        // 10°00'36" = 10.01
        assert!((decode_angle(100_036) - 10.01).abs() < 1e-12);
        // 3°45'18"
        let expected = 3.0 + 45.0 / 60.0 + 18.0 / 3600.0;
        assert_eq!(decode_angle(34_518), expected);
    }

    #[test]
    fn test_degrees_truncate() {
        // 40°59'59" must stay in the 40s
        let v = decode_angle(405_959);
        assert!(v > 40.99 && v < 41.0, "got {}", v);
    }

    #[test]
    fn test_sign_symmetry() {
        for raw in [1, 59, 100, 3_000, 403_015, 900_000, 1_795_959, i32::MAX] {
            assert_eq!(decode_angle(-raw), -decode_angle(raw), "raw = {}", raw);
        }
    }

    #[test]
    fn test_min_value_does_not_overflow() {
        let v = decode_angle(i32::MIN);
        assert!(v < -214_000.0);
    }

    #[test]
    fn test_out_of_range_passes_through() {
        // 200°75'99" is not a valid angle but decodes arithmetically
        let expected = 200.0 + 75.0 / 60.0 + 99.0 / 3600.0;
        assert_eq!(decode_angle(2_007_599), expected);
    }
}
