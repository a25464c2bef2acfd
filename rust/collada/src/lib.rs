// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # C3ML COLLADA
//!
//! Import of COLLADA scene graphs into the C3ML entity tree and export of
//! Mesh entities back to COLLADA.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use c3ml_collada::{ColladaImporter, ImportOptions, write_collada};
//!
//! let collection = ColladaImporter::new(ImportOptions::default()).import(bytes)?;
//! let dae = write_collada(&collection);
//! ```

pub mod document;
pub mod error;
pub mod extra;
pub mod importer;
pub mod mesh;
pub mod writer;

pub use error::{Error, ReferenceKind, Result};
pub use importer::{import_collada, local_transform, ColladaImporter, ImportOptions};
pub use writer::write_collada;
