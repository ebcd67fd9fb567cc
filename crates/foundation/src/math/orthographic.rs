use super::{GeoCoordinate, clamp_latitude, normalize_longitude};

/// Inverse orthographic projection for a sphere drawn as a screen-space disc.
///
/// `screen_x`/`screen_y` are pixel offsets from the disc center (y grows
/// downward), `radius` is the disc radius in pixels and `center` is the
/// geographic point facing the viewer.
///
/// Returns `None` for offsets outside the disc. The rim itself is inside.
/// This runs once per covered pixel per frame, so every `asin` argument is
/// clamped to keep rounding at the rim from producing NaN.
pub fn sphere_screen_to_geo(
    screen_x: f64,
    screen_y: f64,
    radius: f64,
    center: GeoCoordinate,
) -> Option<GeoCoordinate> {
    let dist2 = screen_x * screen_x + screen_y * screen_y;
    if radius.is_nan() || radius <= 0.0 || dist2 > radius * radius {
        return None;
    }
    if dist2 == 0.0 {
        return Some(center);
    }

    let x = screen_x;
    let y = -screen_y;
    let rho = dist2.sqrt();
    let c = (rho / radius).clamp(-1.0, 1.0).asin();
    let (sin_c, cos_c) = c.sin_cos();

    let phi0 = center.lat.to_radians();
    let lambda0 = center.lon.to_radians();
    let (sin_phi0, cos_phi0) = phi0.sin_cos();

    let lat = (cos_c * sin_phi0 + y * sin_c * cos_phi0 / rho)
        .clamp(-1.0, 1.0)
        .asin();
    let lon = lambda0 + (x * sin_c).atan2(rho * cos_phi0 * cos_c - y * sin_phi0 * sin_c);

    Some(GeoCoordinate::new(
        normalize_longitude(lon.to_degrees()),
        clamp_latitude(lat.to_degrees()),
    ))
}
