// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seams for collaborators that live outside this crate: command-line
//! converters and the remote IFC geometry service.

use crate::error::Result;
use crate::format::InputFormat;
use std::collections::BTreeMap;

/// Named side files (textures, binary buffers) keyed by relative path
pub type Resources = BTreeMap<String, Vec<u8>>;

/// Converts Shapefile / GeoJSON bytes to KML
pub trait VectorToKml {
    fn to_kml(&self, input: &[u8], format: InputFormat) -> Result<Vec<u8>>;
}

/// Output of a COLLADA → glTF conversion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GltfOutput {
    /// The `.gltf` JSON document
    pub gltf: Vec<u8>,
    /// Files the document references by relative URI
    pub files: Resources,
}

/// Converts a COLLADA document (plus the textures it references) to glTF
pub trait ColladaToGltf {
    fn to_gltf(&self, collada: &[u8], resources: &Resources) -> Result<GltfOutput>;
}

/// Extracts geometry from IFC; the result is passed through untouched
pub trait IfcGeometryService {
    fn extract(&self, ifc: &[u8]) -> Result<serde_json::Value>;
}
