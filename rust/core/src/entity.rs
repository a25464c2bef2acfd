// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entities: the nodes of a C3ML tree.
//!
//! An entity carries a name, a free-form property map, an optional color and
//! exactly one geometry payload. Parent/child links are stored as ids and are
//! only changed through [`EntityCollection`](crate::EntityCollection), which
//! keeps both directions in sync.

use crate::color::Color;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `[latitude°, longitude°, altitude m]`
pub type Coordinate = [f64; 3];

/// Entity property map
pub type Properties = BTreeMap<String, String>;

/// Entity kind, mirrors the geometry variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Point,
    Line,
    Polygon,
    Mesh,
    Container,
}

/// Anchor of a mesh on the globe
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

/// Triangle mesh in local Cartesian meters, placed by `geo_location`,
/// `rotation` (degrees about X, Y, Z) and per-axis `scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Flat XYZ triples
    pub positions: Vec<f64>,
    /// Flat XYZ triples, parallel to `positions` (may be empty)
    pub normals: Vec<f64>,
    /// Flat vertex index triples
    pub triangles: Vec<u32>,
    pub geo_location: GeoLocation,
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Default for MeshData {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            triangles: Vec::new(),
            geo_location: GeoLocation::default(),
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl MeshData {
    pub fn new(positions: Vec<f64>, normals: Vec<f64>, triangles: Vec<u32>) -> Self {
        Self {
            positions,
            normals,
            triangles,
            ..Self::default()
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

/// Geometry payload of an entity
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Vec<Coordinate>),
    Line(Vec<Coordinate>),
    Polygon {
        outer: Vec<Coordinate>,
        holes: Vec<Vec<Coordinate>>,
    },
    Mesh(MeshData),
    Container,
}

impl Geometry {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Geometry::Point(_) => EntityType::Point,
            Geometry::Line(_) => EntityType::Line,
            Geometry::Polygon { .. } => EntityType::Polygon,
            Geometry::Mesh(_) => EntityType::Mesh,
            Geometry::Container => EntityType::Container,
        }
    }

    /// Vertex list of point, line and polygon (outer ring) geometry
    pub fn coordinates(&self) -> &[Coordinate] {
        match self {
            Geometry::Point(c) | Geometry::Line(c) => c,
            Geometry::Polygon { outer, .. } => outer,
            Geometry::Mesh(_) | Geometry::Container => &[],
        }
    }
}

/// Generate a fresh entity id
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A node of the C3ML tree
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub properties: Properties,
    pub color: Option<Color>,
    pub geometry: Geometry,
    pub(crate) parent_id: Option<String>,
    pub(crate) children_ids: Vec<String>,
}

impl Entity {
    /// Create an entity with a generated id
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            properties: Properties::new(),
            color: None,
            geometry,
            parent_id: None,
            children_ids: Vec::new(),
        }
    }

    pub fn container(name: impl Into<String>) -> Self {
        Self::new(name, Geometry::Container)
    }

    pub fn point(name: impl Into<String>, coordinates: Vec<Coordinate>) -> Self {
        Self::new(name, Geometry::Point(coordinates))
    }

    pub fn line(name: impl Into<String>, coordinates: Vec<Coordinate>) -> Self {
        Self::new(name, Geometry::Line(coordinates))
    }

    pub fn polygon(
        name: impl Into<String>,
        outer: Vec<Coordinate>,
        holes: Vec<Vec<Coordinate>>,
    ) -> Self {
        Self::new(name, Geometry::Polygon { outer, holes })
    }

    pub fn mesh(name: impl Into<String>, mesh: MeshData) -> Self {
        Self::new(name, Geometry::Mesh(mesh))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    #[inline]
    pub fn entity_type(&self) -> EntityType {
        self.geometry.entity_type()
    }

    /// Color, falling back to opaque white
    #[inline]
    pub fn color_or_default(&self) -> Color {
        self.color.unwrap_or_default()
    }

    #[inline]
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    #[inline]
    pub fn children_ids(&self) -> &[String] {
        &self.children_ids
    }

    pub fn as_mesh(&self) -> Option<&MeshData> {
        match &self.geometry {
            Geometry::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut MeshData> {
        match &mut self.geometry {
            Geometry::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = Entity::container("a");
        let b = Entity::container("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn type_follows_geometry() {
        assert_eq!(Entity::point("p", vec![[0.0; 3]]).entity_type(), EntityType::Point);
        assert_eq!(Entity::mesh("m", MeshData::default()).entity_type(), EntityType::Mesh);
        assert_eq!(Entity::container("c").entity_type(), EntityType::Container);
    }

    #[test]
    fn default_color_is_white() {
        let e = Entity::line("l", Vec::new());
        assert_eq!(e.color_or_default(), Color::WHITE);
        let e = e.with_color(Color::new(1, 2, 3, 4));
        assert_eq!(e.color_or_default(), Color::new(1, 2, 3, 4));
    }

    #[test]
    fn mesh_defaults() {
        let mesh = MeshData::new(vec![0.0; 9], Vec::new(), vec![0, 1, 2]);
        assert_eq!(mesh.scale, [1.0; 3]);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
    }
}
