// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion pipeline.
//!
//! ```text
//! bytes ─┬─ dae ──────────────────────────► COLLADA importer ─┐
//!        ├─ kml ──────────────────────────► KML importer ─────┤
//!        ├─ kmz ─► doc.kml ───────────────► KML importer ─────┼─► post-processing ─► EntityCollection
//!        ├─ shp/geojson ─► VectorToKml ───► KML importer ─────┘
//!        └─ ifc ─► IfcGeometryService ─────────────────────────────────────────────► JSON (opaque)
//! ```

use crate::error::{Error, Result};
use crate::external::{ColladaToGltf, IfcGeometryService, Resources, VectorToKml};
use crate::footprints::{derive_footprints, normalize_altitude, normalize_height};
use crate::format::{InputFormat, OutputFormat};
use crate::gltf::embed_resources;
use crate::kmz::{read_kmz, write_kmz};
use c3ml_collada::{write_collada, ColladaImporter, ImportOptions};
use c3ml_core::EntityCollection;
use c3ml_kml::{write_kml, KmlImporter, KmlWriteOptions};

/// Post-processing and import settings
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Mesh placement overrides for COLLADA import
    pub import: ImportOptions,
    /// Attach a footprint polygon to every mesh
    pub derive_footprints: bool,
    /// Stretch meshes to this total height (meters)
    pub target_height: Option<f64>,
    /// Move the lowest mesh point to this altitude (meters)
    pub target_altitude: Option<f64>,
}

/// Result of a conversion
#[derive(Debug)]
pub enum Conversion {
    Entities(EntityCollection),
    /// IFC geometry as returned by the geometry service
    Ifc(serde_json::Value),
}

impl Conversion {
    pub fn entities(&self) -> Option<&EntityCollection> {
        match self {
            Conversion::Entities(collection) => Some(collection),
            Conversion::Ifc(_) => None,
        }
    }

    pub fn into_entities(self) -> Option<EntityCollection> {
        match self {
            Conversion::Entities(collection) => Some(collection),
            Conversion::Ifc(_) => None,
        }
    }
}

/// Dispatches input bytes to the right importer and runs post-processing
#[derive(Default)]
pub struct Converter {
    options: PipelineOptions,
    vector_tool: Option<Box<dyn VectorToKml>>,
    gltf_tool: Option<Box<dyn ColladaToGltf>>,
    ifc_service: Option<Box<dyn IfcGeometryService>>,
}

impl Converter {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn with_vector_tool(mut self, tool: impl VectorToKml + 'static) -> Self {
        self.vector_tool = Some(Box::new(tool));
        self
    }

    pub fn with_gltf_tool(mut self, tool: impl ColladaToGltf + 'static) -> Self {
        self.gltf_tool = Some(Box::new(tool));
        self
    }

    pub fn with_ifc_service(mut self, service: impl IfcGeometryService + 'static) -> Self {
        self.ifc_service = Some(Box::new(service));
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Convert one asset. Nothing is returned unless the whole asset
    /// converted.
    pub fn convert(&self, bytes: &[u8], format: InputFormat) -> Result<Conversion> {
        tracing::info!(format = format.extension(), bytes = bytes.len(), "Converting asset");

        let mut collection = match format {
            InputFormat::Collada => ColladaImporter::new(self.options.import.clone()).import(bytes)?,
            InputFormat::Kml => KmlImporter::new().import(bytes)?,
            InputFormat::Kmz => KmlImporter::new().import(&read_kmz(bytes)?)?,
            InputFormat::Shapefile | InputFormat::GeoJson => {
                let tool = self
                    .vector_tool
                    .as_ref()
                    .ok_or(Error::MissingCollaborator("vector-to-KML converter"))?;
                let kml = tool.to_kml(bytes, format)?;
                KmlImporter::new().import(&kml)?
            }
            InputFormat::Ifc => {
                let service = self
                    .ifc_service
                    .as_ref()
                    .ok_or(Error::MissingCollaborator("IFC geometry service"))?;
                return Ok(Conversion::Ifc(service.extract(bytes)?));
            }
        };

        self.post_process(&mut collection)?;
        Ok(Conversion::Entities(collection))
    }

    /// Height, then altitude normalization, then footprints
    pub fn post_process(&self, collection: &mut EntityCollection) -> Result<()> {
        if let Some(height) = self.options.target_height {
            normalize_height(collection, height);
        }
        if let Some(altitude) = self.options.target_altitude {
            normalize_altitude(collection, altitude);
        }
        if self.options.derive_footprints {
            derive_footprints(collection)?;
        }
        collection.validate()?;
        Ok(())
    }

    /// Serialize a collection. `resources` are packed into KMZ archives and
    /// handed to the glTF converter.
    pub fn export(
        &self,
        collection: &EntityCollection,
        format: OutputFormat,
        resources: &Resources,
    ) -> Result<Vec<u8>> {
        let bytes = match format {
            OutputFormat::Json => collection.to_json()?.into_bytes(),
            OutputFormat::Kml => write_kml(collection, &KmlWriteOptions::default()).into_bytes(),
            OutputFormat::Kmz => write_kmz(collection, None, resources)?,
            OutputFormat::Collada => write_collada(collection).into_bytes(),
            OutputFormat::Gltf => {
                let tool = self
                    .gltf_tool
                    .as_ref()
                    .ok_or(Error::MissingCollaborator("COLLADA-to-glTF converter"))?;
                let output = tool.to_gltf(write_collada(collection).as_bytes(), resources)?;
                embed_resources(&output.gltf, &output.files)?
            }
        };
        tracing::info!(format = format.extension(), bytes = bytes.len(), "Exported collection");
        Ok(bytes)
    }
}
