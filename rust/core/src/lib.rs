// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # C3ML Core
//!
//! The canonical entity tree every importer produces and every exporter
//! consumes.
//!
//! - **Entities**: points, lines, polygons, meshes and containers with a name,
//!   string properties and an optional RGBA color
//! - **Collections**: a flat arena keyed by id; children are id references,
//!   so the tree can be traversed and serialized without recursion hazards
//! - **JSON**: flat records with `childrenIds`, see [`EntitySnapshot`]
//!
//! ```rust,ignore
//! use c3ml_core::{Entity, EntityCollection};
//!
//! let mut tree = EntityCollection::new();
//! let root = tree.insert(Entity::container("site"))?;
//! tree.insert_child(&root, Entity::point("flag", vec![[47.0, 8.0, 420.0]]))?;
//! println!("{}", tree.to_json()?);
//! ```

pub mod collection;
pub mod color;
pub mod entity;
pub mod error;
pub mod serialization;
pub mod xml;

pub use collection::EntityCollection;
pub use color::Color;
pub use entity::{
    new_id, Coordinate, Entity, EntityType, GeoLocation, Geometry, MeshData, Properties,
};
pub use error::{Error, Result};
pub use serialization::EntitySnapshot;
