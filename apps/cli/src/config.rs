// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration loaded from environment variables.

use c3ml_core::GeoLocation;

/// CLI configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Program that converts Shapefile/GeoJSON to KML.
    pub vector_tool: String,
    /// Program that converts COLLADA to glTF.
    pub gltf_tool: String,
    /// Attach footprint polygons to meshes.
    pub derive_footprints: bool,
    /// Total mesh height in meters.
    pub target_height: Option<f64>,
    /// Altitude of the lowest mesh point in meters.
    pub target_altitude: Option<f64>,
    /// Anchor for imported COLLADA meshes.
    pub geo_location: Option<GeoLocation>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup. Values that fail to parse
    /// fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str| {
            lookup(key).and_then(|v| match v.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Some(n),
                _ => {
                    tracing::warn!(key, value = v.as_str(), "Ignoring invalid number");
                    None
                }
            })
        };

        Self {
            vector_tool: lookup("C3ML_VECTOR_TOOL").unwrap_or_else(|| "ogr2ogr".into()),
            gltf_tool: lookup("C3ML_GLTF_TOOL").unwrap_or_else(|| "COLLADA2GLTF-bin".into()),
            derive_footprints: lookup("C3ML_DERIVE_FOOTPRINTS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            target_height: number("C3ML_TARGET_HEIGHT"),
            target_altitude: number("C3ML_TARGET_ALTITUDE"),
            geo_location: lookup("C3ML_GEO_LOCATION").and_then(|v| {
                let parsed = parse_geo_location(&v);
                if parsed.is_none() {
                    tracing::warn!(value = v.as_str(), "Ignoring invalid C3ML_GEO_LOCATION, expected lat,lon,alt");
                }
                parsed
            }),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// `lat,lon,alt`; altitude may be omitted
pub fn parse_geo_location(value: &str) -> Option<GeoLocation> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts[..] {
        [lat, lon] => Some(GeoLocation::new(lat, lon, 0.0)),
        [lat, lon, alt] => Some(GeoLocation::new(lat, lon, alt)),
        _ => None,
    }
}
