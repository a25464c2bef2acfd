// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena storage for one converted asset.
//!
//! The [`EntityCollection`] owns every entity produced by a single
//! conversion. Entities are kept in insertion order in a flat vector and
//! looked up by id through a hash index; parent/child structure is stored as
//! id references on the entities themselves. All linking goes through this
//! type, which rejects self-parenting, cycles and double parents so the
//! stored structure is always a forest.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::entity::{new_id, Entity, Geometry};
use crate::error::{Error, Result};

/// Flat, id-indexed forest of entities
#[derive(Debug, Clone, Default)]
pub struct EntityCollection {
    entities: Vec<Entity>,
    index: FxHashMap<String, usize>,
}

impl EntityCollection {
    /// Creates a new, empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.index.get(id).map(|&i| &self.entities[i])
    }

    /// Mutable access. Links are not reachable from here, only content.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.index.get(id).map(|&i| &mut self.entities[i])
    }

    /// Entities in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Entities without a parent, in insertion order
    pub fn roots(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.parent_id.is_none())
    }

    /// Direct children of `id` in their stored order
    pub fn children<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.get(id)
            .map(|e| e.children_ids.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |child| self.get(child))
    }

    /// `preferred` if it is free, otherwise a generated id.
    pub fn unique_id(&self, preferred: Option<&str>) -> String {
        match preferred {
            Some(id) if !id.is_empty() && !self.contains(id) => id.to_string(),
            _ => new_id(),
        }
    }

    /// Add a root entity. Any links the entity carries are discarded.
    pub fn insert(&mut self, mut entity: Entity) -> Result<String> {
        if self.index.contains_key(&entity.id) {
            return Err(Error::DuplicateId(entity.id));
        }
        entity.parent_id = None;
        entity.children_ids.clear();

        let id = entity.id.clone();
        self.index.insert(id.clone(), self.entities.len());
        self.entities.push(entity);
        Ok(id)
    }

    /// Add an entity as the last child of `parent_id`.
    pub fn insert_child(&mut self, parent_id: &str, entity: Entity) -> Result<String> {
        if !self.contains(parent_id) {
            return Err(Error::UnknownEntity(parent_id.to_string()));
        }
        let id = self.insert(entity)?;
        self.attach_child(parent_id, &id)?;
        Ok(id)
    }

    /// Link two existing entities.
    ///
    /// Fails when either id is unknown, when `child_id` already has a parent,
    /// and when the link would close a cycle (including an entity becoming
    /// its own child).
    pub fn attach_child(&mut self, parent_id: &str, child_id: &str) -> Result<()> {
        let parent_idx = *self
            .index
            .get(parent_id)
            .ok_or_else(|| Error::UnknownEntity(parent_id.to_string()))?;
        let child_idx = *self
            .index
            .get(child_id)
            .ok_or_else(|| Error::UnknownEntity(child_id.to_string()))?;

        if let Some(existing) = &self.entities[child_idx].parent_id {
            return Err(Error::AlreadyParented {
                child: child_id.to_string(),
                parent: existing.clone(),
            });
        }
        if self.is_ancestor_or_self(child_id, parent_id) {
            return Err(Error::CyclicReference {
                parent: parent_id.to_string(),
                child: child_id.to_string(),
            });
        }

        self.entities[child_idx].parent_id = Some(parent_id.to_string());
        self.entities[parent_idx].children_ids.push(child_id.to_string());
        Ok(())
    }

    /// Whether `candidate` is `id` itself or one of its ancestors.
    fn is_ancestor_or_self(&self, candidate: &str, id: &str) -> bool {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(cur) = current {
            if cur == candidate {
                return true;
            }
            steps += 1;
            if steps > self.entities.len() {
                // A loop already exists upstream; treat as cyclic.
                return true;
            }
            current = self.get(cur).and_then(|e| e.parent_id.as_deref());
        }
        false
    }

    /// `id` and everything below it, depth first, parents before children.
    pub fn descendants_depth_first(&self, id: &str) -> Vec<&Entity> {
        let mut out = Vec::new();
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut stack: Vec<&str> = vec![id];

        while let Some(cur) = stack.pop() {
            if !visited.insert(cur) {
                continue;
            }
            if let Some(entity) = self.get(cur) {
                out.push(entity);
                stack.extend(entity.children_ids.iter().rev().map(String::as_str));
            }
        }
        out
    }

    /// Re-check every tree and geometry invariant.
    pub fn validate(&self) -> Result<()> {
        let mut seen_as_child: FxHashSet<&str> = FxHashSet::default();

        for entity in &self.entities {
            for child_id in &entity.children_ids {
                if child_id == &entity.id {
                    return Err(Error::CyclicReference {
                        parent: entity.id.clone(),
                        child: child_id.clone(),
                    });
                }
                let child = self
                    .get(child_id)
                    .ok_or_else(|| Error::UnknownEntity(child_id.clone()))?;
                if child.parent_id.as_deref() != Some(entity.id.as_str()) {
                    return Err(Error::invalid(
                        child_id,
                        format!("listed as child of {} but its parent is {:?}", entity.id, child.parent_id),
                    ));
                }
                if !seen_as_child.insert(child_id.as_str()) {
                    return Err(Error::invalid(child_id, "listed as a child more than once"));
                }
            }

            if let Some(parent_id) = &entity.parent_id {
                let parent = self
                    .get(parent_id)
                    .ok_or_else(|| Error::UnknownEntity(parent_id.clone()))?;
                if !parent.children_ids.contains(&entity.id) {
                    return Err(Error::invalid(
                        &entity.id,
                        format!("parent {} does not list it as a child", parent_id),
                    ));
                }
                if self.is_ancestor_or_self(&entity.id, parent_id) {
                    return Err(Error::CyclicReference {
                        parent: parent_id.clone(),
                        child: entity.id.clone(),
                    });
                }
            }

            validate_geometry(entity)?;
        }
        Ok(())
    }

    /// Rebuild a collection from fully linked entities, checking invariants.
    pub(crate) fn from_linked(entities: Vec<Entity>) -> Result<Self> {
        let mut collection = Self::new();
        for entity in entities {
            if collection.index.contains_key(&entity.id) {
                return Err(Error::DuplicateId(entity.id));
            }
            collection.index.insert(entity.id.clone(), collection.entities.len());
            collection.entities.push(entity);
        }
        collection.validate()?;
        Ok(collection)
    }
}

fn validate_geometry(entity: &Entity) -> Result<()> {
    match &entity.geometry {
        Geometry::Mesh(mesh) => {
            if mesh.positions.len() % 3 != 0 {
                return Err(Error::invalid(&entity.id, "position count is not a multiple of 3"));
            }
            if !mesh.normals.is_empty() && mesh.normals.len() != mesh.positions.len() {
                return Err(Error::invalid(&entity.id, "normals are not parallel to positions"));
            }
            if mesh.triangles.len() % 3 != 0 {
                return Err(Error::invalid(&entity.id, "triangle index count is not a multiple of 3"));
            }
            let vertex_count = mesh.vertex_count();
            if mesh.triangles.iter().any(|&i| i as usize >= vertex_count) {
                return Err(Error::invalid(&entity.id, "triangle index out of range"));
            }
        }
        Geometry::Polygon { outer, holes } => {
            for ring in std::iter::once(outer).chain(holes) {
                if !ring.is_empty() && ring.first() != ring.last() {
                    return Err(Error::invalid(&entity.id, "polygon ring is not closed"));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::MeshData;

    #[test]
    fn insert_and_link() {
        let mut c = EntityCollection::new();
        let root = c.insert(Entity::container("root").with_id("root")).unwrap();
        let child = c.insert_child(&root, Entity::point("p", vec![[1.0, 2.0, 3.0]])).unwrap();

        assert_eq!(c.len(), 2);
        assert_eq!(c.get(&child).unwrap().parent_id(), Some("root"));
        assert_eq!(c.get("root").unwrap().children_ids(), &[child.clone()]);
        assert_eq!(c.roots().count(), 1);
        assert_eq!(c.children("root").next().unwrap().id, child);
        c.validate().unwrap();
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut c = EntityCollection::new();
        c.insert(Entity::container("a").with_id("x")).unwrap();
        let err = c.insert(Entity::container("b").with_id("x")).unwrap_err();
        assert!(matches!(err, Error::DuplicateId(_)));
    }

    #[test]
    fn self_child_rejected() {
        let mut c = EntityCollection::new();
        c.insert(Entity::container("a").with_id("a")).unwrap();
        let err = c.attach_child("a", "a").unwrap_err();
        assert!(matches!(err, Error::CyclicReference { .. }));
        assert!(c.get("a").unwrap().children_ids().is_empty());
    }

    #[test]
    fn ancestor_as_child_rejected() {
        let mut c = EntityCollection::new();
        c.insert(Entity::container("a").with_id("a")).unwrap();
        c.insert_child("a", Entity::container("b").with_id("b")).unwrap();
        c.insert_child("b", Entity::container("c").with_id("c")).unwrap();
        // "a" is a root, so it is not parented yet; linking it under its own
        // grandchild must still fail.
        let err = c.attach_child("c", "a").unwrap_err();
        assert!(matches!(err, Error::CyclicReference { .. }));
    }

    #[test]
    fn second_parent_rejected() {
        let mut c = EntityCollection::new();
        c.insert(Entity::container("a").with_id("a")).unwrap();
        c.insert(Entity::container("b").with_id("b")).unwrap();
        c.insert_child("a", Entity::container("c").with_id("c")).unwrap();
        let err = c.attach_child("b", "c").unwrap_err();
        assert!(matches!(err, Error::AlreadyParented { .. }));
    }

    #[test]
    fn unique_id_falls_back_when_taken() {
        let mut c = EntityCollection::new();
        c.insert(Entity::container("a").with_id("node")).unwrap();
        assert_eq!(c.unique_id(Some("free")), "free");
        assert_ne!(c.unique_id(Some("node")), "node");
        assert_ne!(c.unique_id(Some("")), "");
    }

    #[test]
    fn depth_first_order() {
        let mut c = EntityCollection::new();
        c.insert(Entity::container("r").with_id("r")).unwrap();
        c.insert_child("r", Entity::container("a").with_id("a")).unwrap();
        c.insert_child("a", Entity::container("a1").with_id("a1")).unwrap();
        c.insert_child("r", Entity::container("b").with_id("b")).unwrap();

        let order: Vec<&str> = c.descendants_depth_first("r").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, vec!["r", "a", "a1", "b"]);
    }

    #[test]
    fn validate_catches_bad_mesh() {
        let mut c = EntityCollection::new();
        c.insert(Entity::mesh("m", MeshData::new(vec![0.0; 9], Vec::new(), vec![0, 1, 3])))
            .unwrap();
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_catches_open_ring() {
        let mut c = EntityCollection::new();
        let ring = vec![[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
        c.insert(Entity::polygon("p", ring, Vec::new())).unwrap();
        assert!(c.validate().is_err());
    }
}
