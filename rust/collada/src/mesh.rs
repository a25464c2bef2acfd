// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `<mesh>` data extraction: sources, vertices and triangle primitives.

use crate::document::{child, children_named, parse_floats, parse_indices, strip_hash};
use crate::error::{Error, Result};
use roxmltree::Node;

/// Primitive kinds that are recognized but not converted
const SKIPPED_PRIMITIVES: &[&str] = &["lines", "linestrips", "polygons", "polylist", "trifans", "tristrips"];

/// Raw vertex data of one `<triangles>` element, in document units
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTriangles {
    pub positions: Vec<f64>,
    /// Empty or parallel to `positions`
    pub normals: Vec<f64>,
    pub triangles: Vec<u32>,
    /// Material symbol bound through `<instance_material>`
    pub material: Option<String>,
}

/// Extract every `<triangles>` primitive of a `<geometry>`.
///
/// Other primitive kinds are skipped with a debug log.
pub fn read_geometry(geometry: Node) -> Result<Vec<RawTriangles>> {
    let geometry_id = geometry.attribute("id").unwrap_or_default();
    let Some(mesh) = child(geometry, "mesh") else {
        tracing::debug!(geometry = geometry_id, "Geometry has no <mesh>, skipping");
        return Ok(Vec::new());
    };

    let mut primitives = Vec::new();
    for element in mesh.children().filter(|n| n.is_element()) {
        let name = element.tag_name().name();
        if name == "triangles" {
            primitives.push(read_triangles(mesh, element)?);
        } else if SKIPPED_PRIMITIVES.contains(&name) {
            tracing::debug!(geometry = geometry_id, primitive = name, "Unsupported primitive, skipping");
        }
    }
    Ok(primitives)
}

fn read_triangles(mesh: Node, triangles: Node) -> Result<RawTriangles> {
    let inputs: Vec<Input> = children_named(triangles, "input")
        .map(Input::read)
        .collect::<Result<_>>()?;

    let vertex_input = inputs
        .iter()
        .find(|i| i.semantic == "VERTEX")
        .ok_or_else(|| Error::unreadable("<triangles> without a VERTEX input"))?;
    let stride = inputs.iter().map(|i| i.offset).max().unwrap_or(0) + 1;

    let vertices = find_by_id(mesh, "vertices", vertex_input.source)?;
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    for input in children_named(vertices, "input") {
        let input = Input::read(input)?;
        match input.semantic {
            "POSITION" => positions = read_source(mesh, input.source)?,
            "NORMAL" => normals = read_source(mesh, input.source)?,
            _ => {}
        }
    }
    if positions.is_empty() {
        return Err(Error::unreadable(format!(
            "<vertices id=\"{}\"> has no POSITION data",
            vertex_input.source
        )));
    }

    let p = match child(triangles, "p").and_then(|n| n.text()) {
        Some(text) => parse_indices(text)?,
        None => Vec::new(),
    };
    let corners = p.len() / stride;
    let corners = corners - corners % 3;

    let triangle_indices: Vec<u32> = (0..corners)
        .map(|c| p[c * stride + vertex_input.offset])
        .collect();

    // A primitive-level NORMAL input is scattered onto the shared vertex slots
    if let Some(normal_input) = inputs.iter().find(|i| i.semantic == "NORMAL") {
        let source = read_source(mesh, normal_input.source)?;
        let mut scattered = vec![0.0; positions.len()];
        for c in 0..corners {
            let vertex = triangle_indices[c] as usize;
            let normal = p[c * stride + normal_input.offset] as usize;
            if vertex * 3 + 2 < scattered.len() && normal * 3 + 2 < source.len() {
                scattered[vertex * 3..vertex * 3 + 3].copy_from_slice(&source[normal * 3..normal * 3 + 3]);
            }
        }
        normals = scattered;
    }
    if normals.len() != positions.len() {
        normals.clear();
    }

    Ok(RawTriangles {
        positions,
        normals,
        triangles: triangle_indices,
        material: triangles.attribute("material").map(str::to_string),
    })
}

struct Input<'a> {
    semantic: &'a str,
    source: &'a str,
    offset: usize,
}

impl<'a> Input<'a> {
    fn read(node: Node<'a, '_>) -> Result<Self> {
        let semantic = node.attribute("semantic").unwrap_or_default();
        let source = strip_hash(node.attribute("source").unwrap_or_default());
        let offset = match node.attribute("offset") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| Error::unreadable(format!("invalid input offset '{}'", v)))?,
            None => 0,
        };
        Ok(Self {
            semantic,
            source,
            offset,
        })
    }
}

fn find_by_id<'a, 'input>(
    mesh: Node<'a, 'input>,
    tag: &'static str,
    id: &str,
) -> Result<Node<'a, 'input>> {
    children_named(mesh, tag)
        .find(|n| n.attribute("id") == Some(id))
        .ok_or_else(|| Error::unreadable(format!("mesh has no <{} id=\"{}\">", tag, id)))
}

/// Read XYZ triples from a `<source>`, honouring the accessor stride.
fn read_source(mesh: Node, id: &str) -> Result<Vec<f64>> {
    let source = find_by_id(mesh, "source", id)?;
    let values = match child(source, "float_array").and_then(|n| n.text()) {
        Some(text) => parse_floats(text)?,
        None => Vec::new(),
    };

    let accessor = child(source, "technique_common").and_then(|t| child(t, "accessor"));
    let stride = accessor
        .and_then(|a| a.attribute("stride"))
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(3);
    if stride < 3 {
        return Err(Error::unreadable(format!("source \"{}\" has stride {}", id, stride)));
    }
    if stride == 3 {
        let whole = values.len() - values.len() % 3;
        return Ok(values[..whole].to_vec());
    }
    Ok(values.chunks_exact(stride).flat_map(|c| c[..3].to_vec()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(xml: &str) -> Vec<RawTriangles> {
        let doc = roxmltree::Document::parse(xml).unwrap();
        read_geometry(doc.root_element()).unwrap()
    }

    #[test]
    fn test_shared_offsets() {
        let prims = geometry(
            r##"<geometry id="g"><mesh>
              <source id="p"><float_array count="9">0 0 0 1 0 0 0 1 0</float_array>
                <technique_common><accessor count="3" stride="3"/></technique_common></source>
              <vertices id="v"><input semantic="POSITION" source="#p"/></vertices>
              <triangles count="1" material="mat"><input semantic="VERTEX" source="#v" offset="0"/><p>0 1 2</p></triangles>
              <polylist count="1"><input semantic="VERTEX" source="#v" offset="0"/><vcount>3</vcount><p>0 1 2</p></polylist>
            </mesh></geometry>"##,
        );
        assert_eq!(prims.len(), 1);
        assert_eq!(prims[0].positions.len(), 9);
        assert_eq!(prims[0].triangles, vec![0, 1, 2]);
        assert!(prims[0].normals.is_empty());
        assert_eq!(prims[0].material.as_deref(), Some("mat"));
    }

    #[test]
    fn test_interleaved_indices_and_normals() {
        let prims = geometry(
            r##"<geometry id="g"><mesh>
              <source id="p"><float_array>0 0 0 1 0 0 0 1 0</float_array></source>
              <source id="n"><float_array>0 0 1</float_array></source>
              <vertices id="v"><input semantic="POSITION" source="#p"/></vertices>
              <triangles count="1">
                <input semantic="VERTEX" source="#v" offset="0"/>
                <input semantic="NORMAL" source="#n" offset="1"/>
                <p>2 0 1 0 0 0</p>
              </triangles>
            </mesh></geometry>"##,
        );
        assert_eq!(prims[0].triangles, vec![2, 1, 0]);
        assert_eq!(prims[0].normals, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_wide_stride_source() {
        let prims = geometry(
            r##"<geometry id="g"><mesh>
              <source id="p"><float_array>0 0 0 9 1 0 0 9 0 1 0 9</float_array>
                <technique_common><accessor stride="4"/></technique_common></source>
              <vertices id="v"><input semantic="POSITION" source="#p"/></vertices>
              <triangles><input semantic="VERTEX" source="#v" offset="0"/><p>0 1 2</p></triangles>
            </mesh></geometry>"##,
        );
        assert_eq!(prims[0].positions, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_missing_vertex_input() {
        let doc = roxmltree::Document::parse(
            r#"<geometry id="g"><mesh><triangles><p>0 1 2</p></triangles></mesh></geometry>"#,
        )
        .unwrap();
        assert!(read_geometry(doc.root_element()).is_err());
    }
}
