use std::f64::consts::PI;

use super::ZoomLevel;

/// Edge length of one provider tile, in pixels.
pub const TILE_SIZE: u32 = 256;

/// Latitude bound (degrees). Poles are a hard boundary for Web Mercator.
pub const MAX_LATITUDE: f64 = 85.0;

/// Longitude/latitude in degrees.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct GeoCoordinate {
    pub lon: f64,
    pub lat: f64,
}

impl GeoCoordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Wraps longitude into `[-180, 180)` and clamps latitude to the Mercator bound.
    pub fn normalized(self) -> Self {
        Self {
            lon: normalize_longitude(self.lon),
            lat: clamp_latitude(self.lat),
        }
    }
}

/// A point in the provider's Mercator pixel space at some zoom.
///
/// The origin is the date-line/north-pole corner; both axes span
/// `0..TILE_SIZE * 2^zoom`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for WorldPoint {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

pub fn geo_to_world(coord: GeoCoordinate, zoom: ZoomLevel) -> WorldPoint {
    let scale = zoom.world_size();
    let x = (coord.lon + 180.0) / 360.0 * scale;
    let sin_lat = coord.lat.to_radians().sin();
    let y = (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)) * scale;
    WorldPoint::new(x, y)
}

/// Exact inverse of [`geo_to_world`]. The result is not normalized: points
/// outside the world square map to longitudes outside `[-180, 180)`.
pub fn world_to_geo(point: WorldPoint, zoom: ZoomLevel) -> GeoCoordinate {
    let scale = zoom.world_size();
    let lon = point.x / scale * 360.0 - 180.0;
    let n = PI - 2.0 * PI * point.y / scale;
    let lat = n.sinh().atan().to_degrees();
    GeoCoordinate::new(lon, lat)
}

pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
}

/// Wraps a longitude into the half-open range `[-180, 180)`.
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::{
        GeoCoordinate, MAX_LATITUDE, WorldPoint, clamp_latitude, geo_to_world,
        normalize_longitude, world_to_geo,
    };
    use crate::math::{MAX_ZOOM, MIN_ZOOM, ZoomLevel};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn clamps_latitude() {
        assert_eq!(clamp_latitude(120.0), 85.0);
        assert_eq!(clamp_latitude(-200.0), -85.0);
        assert_eq!(clamp_latitude(40.0), 40.0);
    }

    #[test]
    fn normalizes_longitude() {
        assert_eq!(normalize_longitude(200.0), -160.0);
        assert_eq!(normalize_longitude(-190.0), 170.0);
        assert_eq!(normalize_longitude(45.0), 45.0);
        assert_eq!(normalize_longitude(180.0), -180.0);
        assert_eq!(normalize_longitude(-180.0), -180.0);
        assert!(normalize_longitude(-1e-20) < 180.0);
    }

    #[test]
    fn origin_maps_to_world_center() {
        let zoom = ZoomLevel::clamped(2);
        let p = geo_to_world(GeoCoordinate::new(0.0, 0.0), zoom);
        assert_close(p.x, 512.0, 1e-9);
        assert_close(p.y, 512.0, 1e-9);
    }

    #[test]
    fn known_cities_stay_inside_world_and_round_trip() {
        let samples = [
            (0.0, 0.0, 2),
            (-74.006, 40.7128, 3),
            (139.6917, 35.6895, 5),
            (12.4964, 41.9028, 8),
        ];
        for (lon, lat, z) in samples {
            let zoom = ZoomLevel::clamped(z);
            let world = geo_to_world(GeoCoordinate::new(lon, lat), zoom);
            assert!(world.x >= 0.0 && world.x <= zoom.world_size());
            assert!(world.y >= 0.0 && world.y <= zoom.world_size());

            let restored = world_to_geo(world, zoom);
            assert_close(restored.lon, lon, 1e-4);
            assert_close(restored.lat, lat, 1e-4);
        }
    }

    #[test]
    fn round_trips_across_clamped_domain_and_all_zooms() {
        for z in MIN_ZOOM..=MAX_ZOOM {
            let zoom = ZoomLevel::clamped(i32::from(z));
            let mut lat = -MAX_LATITUDE;
            while lat <= MAX_LATITUDE {
                let mut lon = -180.0;
                while lon < 180.0 {
                    let coord = GeoCoordinate::new(lon, lat);
                    let world = geo_to_world(coord, zoom);
                    assert!(world.x.is_finite() && world.y.is_finite());
                    let restored = world_to_geo(world, zoom);
                    assert_close(restored.lon, lon, 1e-4);
                    assert_close(restored.lat, lat, 1e-4);
                    lon += 37.5;
                }
                lat += 8.5;
            }
        }
    }

    #[test]
    fn world_offsets_compose() {
        let a = WorldPoint::new(10.0, 20.0);
        let b = WorldPoint::new(2.5, -4.0);
        assert_eq!(a + b, WorldPoint::new(12.5, 16.0));
        assert_eq!(a - b, WorldPoint::new(7.5, 24.0));
    }

    #[test]
    fn normalized_coordinate_wraps_and_clamps() {
        let c = GeoCoordinate::new(190.0, 89.0).normalized();
        assert_eq!(c, GeoCoordinate::new(-170.0, 85.0));
    }
}
