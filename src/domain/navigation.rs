//! Chart maths: world metres to latitude/longitude and to screen space.

use std::cmp::Ordering;

pub const LONG_DEGREE_INTERVAL: f32 = 40_000_000.0 / 360.0;
pub const LAT_DEGREE_INTERVAL: f32 = 10_000_000.0 / 180.0;
pub const LONG_MINUTE_INTERVAL: f32 = LONG_DEGREE_INTERVAL / 60.0;
pub const LAT_MINUTE_INTERVAL: f32 = LAT_DEGREE_INTERVAL / 60.0;
/// Spacing of the chart grid
pub const LINE_INTERVAL: f32 = LAT_MINUTE_INTERVAL;

pub const MIN_ZOOM: i32 = -5;
pub const MAX_ZOOM: i32 = 25;

/// Speed readout multiplier, rounded from 1.94
pub const KNOTS_PER_METRE_PER_SECOND: f32 = 2.0;

/// Speed in knots for a velocity in m/s
pub fn knots(velocity: f32) -> f32 {
    velocity * KNOTS_PER_METRE_PER_SECOND
}

/// Latitude of a world `y` coordinate; positive `y` is south
pub fn format_latitude(y: f32) -> String {
    format_angle(y, LAT_DEGREE_INTERVAL, LAT_MINUTE_INTERVAL, 'S', 'N')
}

/// Longitude of a world `x` coordinate; positive `x` is east
pub fn format_longitude(x: f32) -> String {
    format_angle(x, LONG_DEGREE_INTERVAL, LONG_MINUTE_INTERVAL, 'E', 'W')
}

fn format_angle(value: f32, degree: f32, minute: f32, positive: char, negative: char) -> String {
    let (magnitude, hemisphere) = match value.total_cmp(&0.0) {
        Ordering::Greater => (value, positive),
        Ordering::Less => (-value, negative),
        Ordering::Equal => return "0°".to_string(),
    };
    let degrees = (magnitude / degree) as i16;
    let minutes = ((magnitude % degree) / minute) as i16;
    format!("{degrees}° {minutes}' {hemisphere}")
}

/// Zoom level to world-to-screen scale factor
pub fn zoom_scale(level: i32) -> f32 {
    0.9_f32.powi(level.clamp(MIN_ZOOM, MAX_ZOOM))
}

/// Maps world coordinates onto a screen centred on some world point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scale: f32,
    offset: (f32, f32),
}

impl Viewport {
    pub fn new(scale: f32, center: (f32, f32), screen_center: (f32, f32)) -> Self {
        Self {
            scale,
            offset: (
                screen_center.0 - center.0 * scale,
                screen_center.1 - center.1 * scale,
            ),
        }
    }

    pub fn scale_len(&self, size: f32) -> f32 {
        size * self.scale
    }

    pub fn transform(&self, position: (f32, f32)) -> (f32, f32) {
        (
            position.0 * self.scale + self.offset.0,
            position.1 * self.scale + self.offset.1,
        )
    }

    /// Screen space to world space
    pub fn reverse_transform(&self, position: (f32, f32)) -> (f32, f32) {
        (
            (position.0 - self.offset.0) / self.scale,
            (position.1 - self.offset.1) / self.scale,
        )
    }
}

/// World coordinates of every grid line in `[min, max]`
pub fn grid_lines(min: f32, max: f32) -> Vec<f32> {
    if !(min.is_finite() && max.is_finite()) || max < min {
        return Vec::new();
    }
    let first = (min / LINE_INTERVAL).ceil() as i64;
    let last = (max / LINE_INTERVAL).floor() as i64;
    (first..=last).map(|i| i as f32 * LINE_INTERVAL).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_and_meridian() {
        assert_eq!(format_latitude(0.0), "0°");
        assert_eq!(format_longitude(0.0), "0°");
    }

    #[test]
    fn test_latitude_hemispheres() {
        let y = 2.5 * LAT_DEGREE_INTERVAL + 1.0;
        assert_eq!(format_latitude(y), "2° 30' S");
        assert_eq!(format_latitude(-y), "2° 30' N");
    }

    #[test]
    fn test_longitude_hemispheres() {
        let x = 10.0 * LONG_DEGREE_INTERVAL + 15.5 * LONG_MINUTE_INTERVAL;
        assert_eq!(format_longitude(x), "10° 15' E");
        assert_eq!(format_longitude(-x), "10° 15' W");
    }

    #[test]
    fn test_small_offsets_round_down() {
        assert_eq!(format_latitude(100.0), "0° 0' S");
        assert_eq!(format_longitude(-2_000.0), "0° 1' W");
    }

    #[test]
    fn test_zoom_scale_clamped() {
        assert_eq!(zoom_scale(0), 1.0);
        assert!(zoom_scale(10) < 1.0);
        assert!(zoom_scale(-5) > 1.0);
        assert_eq!(zoom_scale(100), zoom_scale(MAX_ZOOM));
        assert_eq!(zoom_scale(-100), zoom_scale(MIN_ZOOM));
    }

    #[test]
    fn test_viewport_centres_target() {
        let viewport = Viewport::new(0.5, (1_000.0, -400.0), (80.0, 24.0));
        assert_eq!(viewport.transform((1_000.0, -400.0)), (80.0, 24.0));
        assert_eq!(viewport.transform((1_100.0, -400.0)), (130.0, 24.0));
        assert_eq!(viewport.scale_len(60.0), 30.0);
    }

    #[test]
    fn test_viewport_reverse_transform() {
        let viewport = Viewport::new(2.0, (10.0, 20.0), (0.0, 0.0));
        let screen = viewport.transform((35.0, -5.0));
        assert_eq!(viewport.reverse_transform(screen), (35.0, -5.0));
    }

    #[test]
    fn test_grid_lines() {
        let lines = grid_lines(-LINE_INTERVAL * 1.5, LINE_INTERVAL * 2.0);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], -LINE_INTERVAL);
        assert_eq!(lines[3], 2.0 * LINE_INTERVAL);
        assert!(grid_lines(10.0, 20.0).is_empty());
        assert!(grid_lines(5.0, -5.0).is_empty());
    }
}
