// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # C3ML KML
//!
//! KML 2.x documents to the C3ML entity tree and back.
//!
//! Import resolves shared `Style`/`StyleMap` indirection into one color per
//! placemark (KML colors are `aabbggrr`), maps Document/Folder to Container
//! entities and Placemark geometry to Point, Line and Polygon entities.
//! Export writes one cached style per distinct color.

pub mod coordinates;
pub mod error;
pub mod importer;
pub mod repair;
pub mod style;
pub mod writer;

pub use coordinates::{format_coordinates, parse_coordinates};
pub use error::{Error, Result};
pub use importer::{import_kml, KmlImporter};
pub use repair::{repair_namespaces, KML_NAMESPACE};
pub use style::{StyleMapColors, StyleTables};
pub use writer::{write_kml, KmlWriteOptions};
