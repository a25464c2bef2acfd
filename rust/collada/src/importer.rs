// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! COLLADA scene graph → entity tree.
//!
//! The visual scene is walked depth-first. Every `<node>` becomes a Container
//! entity; its `<triangles>` primitives become Mesh children whose positions
//! are baked through the node's world transform, the up-axis correction and
//! the unit scale. The tree is assembled in a local collection and only
//! returned when the whole document converted.

use crate::document::{child, children_named, parse_document, parse_floats, strip_hash, Asset, Libraries};
use crate::error::{Error, ReferenceKind, Result};
use crate::mesh::{read_geometry, RawTriangles};
use c3ml_core::{Color, Entity, EntityCollection, GeoLocation, MeshData, Properties};
use c3ml_geometry::{
    axis_rotation, check_mesh, compose, identity, matrix_from_row_major, non_uniform_scale, scale,
    transform_points, transform_vectors, translation, up_axis_correction, Matrix4, Vector3,
};
use roxmltree::Node;

/// Placement overrides applied to every imported mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportOptions {
    pub geo_location: Option<GeoLocation>,
    /// Degrees about X, Y, Z
    pub rotation: Option<[f64; 3]>,
    pub scale: Option<[f64; 3]>,
}

/// Converts COLLADA documents into entity collections
#[derive(Debug, Clone, Default)]
pub struct ColladaImporter {
    options: ImportOptions,
}

impl ColladaImporter {
    pub fn new(options: ImportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Import a UTF-8 encoded document
    pub fn import(&self, bytes: &[u8]) -> Result<EntityCollection> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::unreadable(format!("document is not UTF-8: {}", e)))?;
        self.import_str(text)
    }

    pub fn import_str(&self, text: &str) -> Result<EntityCollection> {
        let doc = parse_document(text)?;
        let root = doc.root_element();
        let asset = Asset::read(root);
        let libs = Libraries::build(root);

        let mut walker = SceneWalker {
            libs: &libs,
            options: &self.options,
            asset_matrix: scale(asset.meter) * up_axis_correction(asset.up_axis),
            collection: EntityCollection::new(),
            instancing: Vec::new(),
        };

        let Some(scene) = select_visual_scene(root, &libs)? else {
            tracing::warn!("COLLADA document has no visual scene");
            return Ok(walker.collection);
        };

        for node in children_named(scene, "node") {
            walker.visit_node(node, None, &identity())?;
        }

        let collection = walker.collection;
        collection.validate()?;
        tracing::info!(
            entities = collection.len(),
            meter = asset.meter,
            up_axis = asset.up_axis.as_str(),
            "Imported COLLADA document"
        );
        Ok(collection)
    }
}

/// Import with the given options
pub fn import_collada(bytes: &[u8], options: &ImportOptions) -> Result<EntityCollection> {
    ColladaImporter::new(options.clone()).import(bytes)
}

fn select_visual_scene<'a, 'input>(
    root: Node<'a, 'input>,
    libs: &Libraries<'a, 'input>,
) -> Result<Option<Node<'a, 'input>>> {
    let url = child(root, "scene")
        .and_then(|s| child(s, "instance_visual_scene"))
        .and_then(|i| i.attribute("url"));

    match url {
        Some(url) => {
            let id = strip_hash(url);
            libs.visual_scenes
                .iter()
                .find(|s| s.attribute("id") == Some(id))
                .copied()
                .map(Some)
                .ok_or_else(|| Error::dangling(ReferenceKind::VisualScene, id))
        }
        None => Ok(libs.visual_scenes.first().copied()),
    }
}

/// Local transform of a node: its transform elements multiplied in
/// document order.
pub fn local_transform(node: Node) -> Result<Matrix4<f64>> {
    let mut local = identity();
    for element in node.children().filter(|n| n.is_element()) {
        let name = element.tag_name().name();
        let values = || parse_floats(element.text().unwrap_or_default());
        let matrix = match name {
            "matrix" => matrix_from_row_major(&values()?)?,
            "translate" => {
                let v = expect_values(name, values()?, 3)?;
                translation(v[0], v[1], v[2])
            }
            "rotate" => {
                let v = expect_values(name, values()?, 4)?;
                axis_rotation(Vector3::new(v[0], v[1], v[2]), v[3])?
            }
            "scale" => {
                let v = expect_values(name, values()?, 3)?;
                non_uniform_scale(v[0], v[1], v[2])
            }
            "lookat" | "skew" => {
                tracing::debug!(element = name, "Unsupported transform element, skipping");
                continue;
            }
            _ => continue,
        };
        local *= matrix;
    }
    Ok(local)
}

fn expect_values(element: &str, values: Vec<f64>, count: usize) -> Result<Vec<f64>> {
    if values.len() != count {
        return Err(c3ml_geometry::Error::transform(format!(
            "<{}> needs {} values, got {}",
            element,
            count,
            values.len()
        ))
        .into());
    }
    Ok(values)
}

struct SceneWalker<'s, 'a, 'input> {
    libs: &'s Libraries<'a, 'input>,
    options: &'s ImportOptions,
    /// Up-axis correction followed by unit scale
    asset_matrix: Matrix4<f64>,
    collection: EntityCollection,
    /// Library nodes currently being instanced
    instancing: Vec<&'a str>,
}

impl<'s, 'a, 'input> SceneWalker<'s, 'a, 'input> {
    fn visit_node(
        &mut self,
        node: Node<'a, 'input>,
        parent: Option<&str>,
        parent_matrix: &Matrix4<f64>,
    ) -> Result<()> {
        let node_id = node.attribute("id");
        let world = compose(parent_matrix, &local_transform(node)?);
        let params = self.libs.params_for(node_id);

        let name = node.attribute("name").or(node_id).unwrap_or("node");
        let entity = Entity::container(name)
            .with_id(self.collection.unique_id(node_id))
            .with_properties(params.clone());
        let entity_id = match parent {
            Some(parent) => self.collection.insert_child(parent, entity)?,
            None => self.collection.insert(entity)?,
        };

        for instance in children_named(node, "instance_geometry") {
            self.instance_geometry(instance, &entity_id, &world, &params)?;
        }

        for instance in children_named(node, "instance_node") {
            let url = strip_hash(instance.attribute("url").unwrap_or_default());
            let (&library_id, &target) = self
                .libs
                .nodes
                .get_key_value(url)
                .ok_or_else(|| Error::dangling(ReferenceKind::Node, url))?;
            if self.instancing.contains(&library_id) {
                return Err(Error::CyclicInstance(library_id.to_string()));
            }
            self.instancing.push(library_id);
            self.visit_node(target, Some(&entity_id), &world)?;
            self.instancing.pop();
        }

        for child_node in children_named(node, "node") {
            self.visit_node(child_node, Some(&entity_id), &world)?;
        }
        Ok(())
    }

    fn instance_geometry(
        &mut self,
        instance: Node<'a, 'input>,
        parent: &str,
        world: &Matrix4<f64>,
        params: &Properties,
    ) -> Result<()> {
        let url = strip_hash(instance.attribute("url").unwrap_or_default());
        let geometry = *self
            .libs
            .geometries
            .get(url)
            .ok_or_else(|| Error::dangling(ReferenceKind::Geometry, url))?;
        let name = geometry.attribute("name").unwrap_or(url);

        let total = self.asset_matrix * world;
        for raw in read_geometry(geometry)? {
            let color = self.resolve_color(instance, raw.material.as_deref())?;
            let mesh = self.build_mesh(raw, &total)?;
            let entity = Entity::mesh(name, mesh)
                .with_color(color)
                .with_properties(params.clone());
            self.collection.insert_child(parent, entity)?;
        }
        Ok(())
    }

    fn build_mesh(&self, raw: RawTriangles, total: &Matrix4<f64>) -> Result<MeshData> {
        let positions = transform_points(&raw.positions, total);
        let normals = transform_vectors(&raw.normals, total);
        check_mesh(&positions, &normals, &raw.triangles)?;

        let mut mesh = MeshData::new(positions, normals, raw.triangles);
        if let Some(geo) = self.options.geo_location {
            mesh.geo_location = geo;
        }
        if let Some(rotation) = self.options.rotation {
            mesh.rotation = rotation;
        }
        if let Some(scale) = self.options.scale {
            mesh.scale = scale;
        }
        Ok(mesh)
    }

    /// instance_material → material → instance_effect → effect → diffuse.
    ///
    /// Absent links fall back to white; a link to an id that is missing from
    /// its library is an error.
    fn resolve_color(&self, instance: Node<'a, 'input>, symbol: Option<&str>) -> Result<Color> {
        let bindings: Vec<Node> = child(instance, "bind_material")
            .and_then(|b| child(b, "technique_common"))
            .map(|t| children_named(t, "instance_material").collect())
            .unwrap_or_default();

        let binding = bindings
            .iter()
            .find(|b| symbol.is_some() && b.attribute("symbol") == symbol)
            .or(if bindings.len() == 1 { bindings.first() } else { None });
        let Some(target) = binding.and_then(|b| b.attribute("target")) else {
            return Ok(Color::WHITE);
        };

        let material_id = strip_hash(target);
        let material = self
            .libs
            .materials
            .get(material_id)
            .ok_or_else(|| Error::dangling(ReferenceKind::Material, material_id))?;

        let Some(effect_url) = child(*material, "instance_effect").and_then(|e| e.attribute("url")) else {
            return Ok(Color::WHITE);
        };
        let effect_id = strip_hash(effect_url);
        let effect = self
            .libs
            .effects
            .get(effect_id)
            .ok_or_else(|| Error::dangling(ReferenceKind::Effect, effect_id))?;

        Ok(diffuse_color(*effect).unwrap_or(Color::WHITE))
    }
}

/// Diffuse color of a `profile_COMMON` effect, `None` for textured or
/// missing diffuse
fn diffuse_color(effect: Node) -> Option<Color> {
    let profile = child(effect, "profile_COMMON")?;
    let diffuse = profile.descendants().find(|n| n.has_tag_name("diffuse"))?;
    let values = parse_floats(child(diffuse, "color")?.text()?).ok()?;
    match values.as_slice() {
        [r, g, b, a, ..] => Some(Color::from_unit_floats([*r, *g, *b, *a])),
        [r, g, b] => Some(Color::from_unit_floats([*r, *g, *b, 1.0])),
        _ => None,
    }
}
