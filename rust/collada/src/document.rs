// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! COLLADA document access: parsing, asset metadata and the per-import
//! library lookup tables.

use crate::error::{Error, Result};
use crate::extra::node_properties;
use c3ml_core::Properties;
use c3ml_geometry::UpAxis;
use roxmltree::{Document, Node, ParsingOptions};
use rustc_hash::FxHashMap;

/// Parse COLLADA text. DTDs are allowed since some exporters emit them.
pub fn parse_document(text: &str) -> Result<Document<'_>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options)?;
    if !doc.root_element().has_tag_name("COLLADA") {
        return Err(Error::unreadable(format!(
            "root element is <{}>, expected <COLLADA>",
            doc.root_element().tag_name().name()
        )));
    }
    Ok(doc)
}

/// `<asset>` values that affect geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Asset {
    /// Meters per document unit
    pub meter: f64,
    pub up_axis: UpAxis,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            meter: 1.0,
            up_axis: UpAxis::Y,
        }
    }
}

impl Asset {
    pub fn read(root: Node) -> Self {
        let mut asset = Asset::default();
        let Some(node) = child(root, "asset") else {
            return asset;
        };

        if let Some(unit) = child(node, "unit") {
            match unit.attribute("meter").map(|m| m.trim().parse::<f64>()) {
                Some(Ok(meter)) if meter.is_finite() && meter > 0.0 => asset.meter = meter,
                Some(_) => tracing::warn!("Ignoring invalid <unit meter>, assuming meters"),
                None => {}
            }
        }

        if let Some(text) = child(node, "up_axis").and_then(|n| n.text()) {
            match UpAxis::parse(text) {
                Some(axis) => asset.up_axis = axis,
                None => tracing::warn!(value = text, "Unknown <up_axis>, assuming Y_UP"),
            }
        }
        asset
    }
}

/// Lookup tables for one document, built once per import.
///
/// Ids are unique per library by contract; when a document repeats one the
/// later element silently replaces the earlier.
pub struct Libraries<'a, 'input> {
    pub geometries: FxHashMap<&'a str, Node<'a, 'input>>,
    pub materials: FxHashMap<&'a str, Node<'a, 'input>>,
    pub effects: FxHashMap<&'a str, Node<'a, 'input>>,
    pub nodes: FxHashMap<&'a str, Node<'a, 'input>>,
    pub visual_scenes: Vec<Node<'a, 'input>>,
    /// Node id → custom parameters from `<extra>`
    pub params: FxHashMap<&'a str, Properties>,
}

impl<'a, 'input> Libraries<'a, 'input> {
    pub fn build(root: Node<'a, 'input>) -> Self {
        let mut libs = Libraries {
            geometries: FxHashMap::default(),
            materials: FxHashMap::default(),
            effects: FxHashMap::default(),
            nodes: FxHashMap::default(),
            visual_scenes: Vec::new(),
            params: FxHashMap::default(),
        };

        for library in root.children().filter(Node::is_element) {
            let (table, item) = match library.tag_name().name() {
                "library_geometries" => (&mut libs.geometries, "geometry"),
                "library_materials" => (&mut libs.materials, "material"),
                "library_effects" => (&mut libs.effects, "effect"),
                "library_nodes" => (&mut libs.nodes, "node"),
                "library_visual_scenes" => {
                    libs.visual_scenes.extend(children_named(library, "visual_scene"));
                    continue;
                }
                _ => continue,
            };
            for element in children_named(library, item) {
                if let Some(id) = element.attribute("id") {
                    table.insert(id, element);
                }
            }
        }

        for node in root.descendants().filter(|n| n.has_tag_name("node")) {
            if let Some(id) = node.attribute("id") {
                let props = node_properties(node);
                if !props.is_empty() {
                    libs.params.insert(id, props);
                }
            }
        }

        tracing::debug!(
            geometries = libs.geometries.len(),
            materials = libs.materials.len(),
            effects = libs.effects.len(),
            library_nodes = libs.nodes.len(),
            visual_scenes = libs.visual_scenes.len(),
            "Indexed COLLADA libraries"
        );
        libs
    }

    /// Custom parameters of a node, empty when it has none
    pub fn params_for(&self, node_id: Option<&str>) -> Properties {
        node_id
            .and_then(|id| self.params.get(id))
            .cloned()
            .unwrap_or_default()
    }
}

/// First element child with the given local name
pub fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

/// All element children with the given local name
pub fn children_named<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| n.has_tag_name(name))
}

/// Drop the `#` of a local URI fragment
#[inline]
pub fn strip_hash(url: &str) -> &str {
    url.trim().strip_prefix('#').unwrap_or(url.trim())
}

/// Whitespace separated floats. Unparseable tokens are an error.
pub fn parse_floats(text: &str) -> Result<Vec<f64>> {
    text.split_ascii_whitespace()
        .map(|t| {
            t.parse::<f64>()
                .map_err(|_| Error::unreadable(format!("invalid number '{}'", t)))
        })
        .collect()
}

/// Whitespace separated non-negative integers
pub fn parse_indices(text: &str) -> Result<Vec<u32>> {
    text.split_ascii_whitespace()
        .map(|t| {
            t.parse::<u32>()
                .map_err(|_| Error::unreadable(format!("invalid index '{}'", t)))
        })
        .collect()
}
