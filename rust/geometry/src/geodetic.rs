// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Local meters to geodetic degrees
//!
//! Uses a spherical Earth with the WGS84 equatorial radius. Good enough for
//! building-sized offsets around an anchor; not a datum transformation.

/// Earth radius used for the local tangent approximation (meters)
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Convert a local offset in meters (x east, y north, z up) around an anchor
/// into `[latitude°, longitude°, altitude m]`.
pub fn to_geodetic(
    x: f64,
    y: f64,
    z: f64,
    anchor_lat: f64,
    anchor_lon: f64,
    anchor_alt: f64,
) -> [f64; 3] {
    let d_lon = x / (EARTH_RADIUS_M * (std::f64::consts::PI * anchor_lat / 180.0).cos());
    let d_lat = y / EARTH_RADIUS_M;

    [
        anchor_lat + d_lat.to_degrees(),
        anchor_lon + d_lon.to_degrees(),
        z + anchor_alt,
    ]
}
