// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # C3ML Processing
//!
//! The conversion pipeline around the COLLADA and KML importers:
//!
//! - **Dispatch** by declared input format, including KMZ unpacking and
//!   vector formats that go through an external KML converter
//! - **Post-processing**: height and altitude normalization, derived
//!   footprint polygons
//! - **Packaging**: JSON, KML, KMZ, COLLADA and self-contained glTF output
//!
//! External tools are reached through the traits in [`external`], so the
//! pipeline itself never spawns processes.
//!
//! ```rust,ignore
//! use c3ml_processing::{Converter, InputFormat, PipelineOptions};
//!
//! let options = PipelineOptions { derive_footprints: true, ..Default::default() };
//! let conversion = Converter::new(options).convert(&bytes, InputFormat::Collada)?;
//! ```

pub mod error;
pub mod external;
pub mod footprints;
pub mod format;
pub mod gltf;
pub mod kmz;
pub mod pipeline;

pub use error::{Error, ErrorKind, Result};
pub use external::{ColladaToGltf, GltfOutput, IfcGeometryService, Resources, VectorToKml};
pub use footprints::{derive_footprints, normalize_altitude, normalize_height};
pub use format::{InputFormat, OutputFormat};
pub use gltf::embed_resources;
pub use kmz::{read_kmz, read_kmz_entries, write_kmz, KMZ_DOCUMENT, KMZ_MODEL};
pub use pipeline::{Conversion, Converter, PipelineOptions};
