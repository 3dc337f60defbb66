//! McIDAS packed angle conversion.

/// Convert a packed `[-]DDDMMSS` integer to decimal degrees.
///
/// Single precision, matching the projection constants it feeds.
pub fn float_lat_lon(packed: i32) -> f32 {
    let sign = if packed < 0 { -1.0f32 } else { 1.0 };
    let v = packed.unsigned_abs();
    let degrees = (v / 10000) as f32;
    let minutes = ((v / 100) % 100) as f32;
    let seconds = (v % 100) as f32;
    sign * (degrees + minutes / 60.0 + seconds / 3600.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_whole_degrees() {
        assert_eq!(float_lat_lon(250000), 25.0);
        assert_eq!(float_lat_lon(-900000), -90.0);
        assert_eq!(float_lat_lon(0), 0.0);
    }

    #[test]
    fn test_minutes_and_seconds() {
        assert_approx_eq!(float_lat_lon(453000), 45.5, 1e-6);
        assert_approx_eq!(float_lat_lon(-1001030), -100.175, 1e-4);
    }
}
