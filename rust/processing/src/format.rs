// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Input/output format detection.

use std::path::Path;

/// Declared format of an input asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFormat {
    Collada,
    Kml,
    Kmz,
    /// Zipped or bare Shapefile, converted through [`VectorToKml`](crate::external::VectorToKml)
    Shapefile,
    /// GeoJSON, converted through [`VectorToKml`](crate::external::VectorToKml)
    GeoJson,
    /// IFC, handed to [`IfcGeometryService`](crate::external::IfcGeometryService)
    Ifc,
}

impl InputFormat {
    /// Format for a file extension, with or without the leading dot
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "dae" => Some(InputFormat::Collada),
            "kml" => Some(InputFormat::Kml),
            "kmz" => Some(InputFormat::Kmz),
            "shp" | "zip" => Some(InputFormat::Shapefile),
            "geojson" | "json" => Some(InputFormat::GeoJson),
            "ifc" => Some(InputFormat::Ifc),
            _ => None,
        }
    }

    /// Format for a MIME type; parameters such as `charset` are ignored
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match essence.as_str() {
            "model/vnd.collada+xml" => Some(InputFormat::Collada),
            "application/vnd.google-earth.kml+xml" => Some(InputFormat::Kml),
            "application/vnd.google-earth.kmz" => Some(InputFormat::Kmz),
            "application/zip" | "application/x-zip-compressed" | "application/x-esri-shape" => {
                Some(InputFormat::Shapefile)
            }
            "application/geo+json" | "application/json" => Some(InputFormat::GeoJson),
            "application/x-step" | "application/ifc" | "model/ifc" => Some(InputFormat::Ifc),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Formats that go through the vector-to-KML converter
    pub fn is_vector(&self) -> bool {
        matches!(self, InputFormat::Shapefile | InputFormat::GeoJson)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            InputFormat::Collada => "dae",
            InputFormat::Kml => "kml",
            InputFormat::Kmz => "kmz",
            InputFormat::Shapefile => "zip",
            InputFormat::GeoJson => "geojson",
            InputFormat::Ifc => "ifc",
        }
    }
}

/// Serialization target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Flat entity records
    #[default]
    Json,
    Kml,
    Kmz,
    Collada,
    Gltf,
}

impl OutputFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(OutputFormat::Json),
            "kml" => Some(OutputFormat::Kml),
            "kmz" => Some(OutputFormat::Kmz),
            "dae" => Some(OutputFormat::Collada),
            "gltf" => Some(OutputFormat::Gltf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Kml => "kml",
            OutputFormat::Kmz => "kmz",
            OutputFormat::Collada => "dae",
            OutputFormat::Gltf => "gltf",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(InputFormat::from_extension("dae"), Some(InputFormat::Collada));
        assert_eq!(InputFormat::from_extension(".KMZ"), Some(InputFormat::Kmz));
        assert_eq!(InputFormat::from_extension("zip"), Some(InputFormat::Shapefile));
        assert_eq!(InputFormat::from_extension("json"), Some(InputFormat::GeoJson));
        assert_eq!(InputFormat::from_extension("obj"), None);
    }

    #[test]
    fn test_from_mime() {
        assert_eq!(
            InputFormat::from_mime("application/vnd.google-earth.kml+xml; charset=utf-8"),
            Some(InputFormat::Kml)
        );
        assert_eq!(InputFormat::from_mime("model/vnd.collada+xml"), Some(InputFormat::Collada));
        assert_eq!(InputFormat::from_mime("text/plain"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(InputFormat::from_path(Path::new("/tmp/site.ifc")), Some(InputFormat::Ifc));
        assert_eq!(InputFormat::from_path(Path::new("README")), None);
        assert!(InputFormat::GeoJson.is_vector());
        assert!(!InputFormat::Kml.is_vector());
    }

    #[test]
    fn test_output_format() {
        assert_eq!(OutputFormat::from_extension("gltf"), Some(OutputFormat::Gltf));
        assert_eq!(OutputFormat::default().extension(), "json");
    }
}
