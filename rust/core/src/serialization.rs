// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON serialization for entity collections.
//!
//! The tree is written as a flat array of entity records. Children are
//! referenced by id (`childrenIds`), never nested, so the output is finite
//! whatever the links look like. Loading re-runs the collection's invariant
//! checks and rejects self-references and cycles.

use serde::{Deserialize, Serialize};

use crate::collection::EntityCollection;
use crate::color::Color;
use crate::entity::{Coordinate, Entity, EntityType, GeoLocation, Geometry, MeshData, Properties};
use crate::error::{Error, Result};

/// Serializable representation of one entity.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySnapshot {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children_ids: Vec<String>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coordinates: Vec<Coordinate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<Coordinate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normals: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triangles: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_location: Option<GeoLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f64; 3]>,
}

impl From<&Entity> for EntitySnapshot {
    fn from(entity: &Entity) -> Self {
        let mut snapshot = EntitySnapshot {
            id: entity.id.clone(),
            name: entity.name.clone(),
            entity_type: entity.entity_type(),
            parent_id: entity.parent_id.clone(),
            children_ids: entity.children_ids.clone(),
            properties: entity.properties.clone(),
            coordinates: Vec::new(),
            holes: Vec::new(),
            color: entity.color,
            positions: None,
            normals: None,
            triangles: None,
            geo_location: None,
            rotation: None,
            scale: None,
        };

        match &entity.geometry {
            Geometry::Point(c) | Geometry::Line(c) => snapshot.coordinates = c.clone(),
            Geometry::Polygon { outer, holes } => {
                snapshot.coordinates = outer.clone();
                snapshot.holes = holes.clone();
            }
            Geometry::Mesh(mesh) => {
                snapshot.positions = Some(mesh.positions.clone());
                snapshot.normals = Some(mesh.normals.clone());
                snapshot.triangles = Some(mesh.triangles.clone());
                snapshot.geo_location = Some(mesh.geo_location);
                snapshot.rotation = Some(mesh.rotation);
                snapshot.scale = Some(mesh.scale);
            }
            Geometry::Container => {}
        }
        snapshot
    }
}

impl EntitySnapshot {
    fn into_entity(self) -> Entity {
        let geometry = match self.entity_type {
            EntityType::Point => Geometry::Point(self.coordinates),
            EntityType::Line => Geometry::Line(self.coordinates),
            EntityType::Polygon => Geometry::Polygon {
                outer: self.coordinates,
                holes: self.holes,
            },
            EntityType::Mesh => {
                let defaults = MeshData::default();
                Geometry::Mesh(MeshData {
                    positions: self.positions.unwrap_or_default(),
                    normals: self.normals.unwrap_or_default(),
                    triangles: self.triangles.unwrap_or_default(),
                    geo_location: self.geo_location.unwrap_or(defaults.geo_location),
                    rotation: self.rotation.unwrap_or(defaults.rotation),
                    scale: self.scale.unwrap_or(defaults.scale),
                })
            }
            EntityType::Container => Geometry::Container,
        };

        Entity {
            id: self.id,
            name: self.name,
            properties: self.properties,
            color: self.color,
            geometry,
            parent_id: self.parent_id,
            children_ids: self.children_ids,
        }
    }
}

impl EntityCollection {
    /// Flat snapshot records in insertion order.
    pub fn to_snapshots(&self) -> Vec<EntitySnapshot> {
        self.iter().map(EntitySnapshot::from).collect()
    }

    /// Serializes the collection to a pretty-printed JSON array.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_snapshots())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserializes a collection from JSON and validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshots: Vec<EntitySnapshot> =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshots(snapshots)
    }

    /// Reconstructs a collection from snapshot records.
    pub fn from_snapshots(snapshots: Vec<EntitySnapshot>) -> Result<Self> {
        EntityCollection::from_linked(snapshots.into_iter().map(EntitySnapshot::into_entity).collect())
    }
}
