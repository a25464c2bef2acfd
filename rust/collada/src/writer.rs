// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity tree → COLLADA 1.4.1 document.
//!
//! Every Mesh entity becomes one `<geometry>` and one scene `<node>`; one
//! effect/material pair is written per distinct color. Output is Z-up with
//! meter units, which is what the mesh buffers already are.

use crate::extra::{format_user_properties, WRITE_PROFILE};
use c3ml_core::xml::{escape_xml, join_numbers};
use c3ml_core::{Color, Entity, EntityCollection, MeshData};
use rustc_hash::FxHashSet;

/// Serialize all Mesh entities of a collection, in collection order.
pub fn write_collada(collection: &EntityCollection) -> String {
    let meshes: Vec<(&Entity, &MeshData)> = collection
        .iter()
        .filter_map(|e| e.as_mesh().map(|m| (e, m)))
        .collect();

    let mut xml = String::new();
    xml.push_str(
        r#"<?xml version="1.0" encoding="utf-8"?>
<COLLADA xmlns="http://www.collada.org/2005/11/COLLADASchema" version="1.4.1">
  <asset>
    <contributor><authoring_tool>c3ml</authoring_tool></contributor>
    <unit name="meter" meter="1"/>
    <up_axis>Z_UP</up_axis>
  </asset>
"#,
    );

    // One effect/material per distinct color, first-seen order
    let mut seen = FxHashSet::default();
    let colors: Vec<Color> = meshes
        .iter()
        .map(|(e, _)| e.color_or_default())
        .filter(|c| seen.insert(c.key()))
        .collect();

    xml.push_str("  <library_effects>\n");
    for color in &colors {
        let [r, g, b, a] = color.to_unit_floats();
        xml.push_str(&format!(
            r#"    <effect id="effect-{key}">
      <profile_COMMON>
        <technique sid="common">
          <lambert>
            <diffuse><color>{r} {g} {b} {a}</color></diffuse>
          </lambert>
        </technique>
      </profile_COMMON>
    </effect>
"#,
            key = color.key(),
        ));
    }
    xml.push_str("  </library_effects>\n");

    xml.push_str("  <library_materials>\n");
    for color in &colors {
        xml.push_str(&format!(
            "    <material id=\"material-{key}\"><instance_effect url=\"#effect-{key}\"/></material>\n",
            key = color.key()
        ));
    }
    xml.push_str("  </library_materials>\n");

    xml.push_str("  <library_geometries>\n");
    for (i, (entity, mesh)) in meshes.iter().enumerate() {
        write_geometry(&mut xml, i, entity, mesh);
    }
    xml.push_str("  </library_geometries>\n");

    xml.push_str("  <library_visual_scenes>\n    <visual_scene id=\"scene\" name=\"scene\">\n");
    for (i, (entity, _)) in meshes.iter().enumerate() {
        write_node(&mut xml, i, entity);
    }
    xml.push_str("    </visual_scene>\n  </library_visual_scenes>\n");

    xml.push_str("  <scene><instance_visual_scene url=\"#scene\"/></scene>\n</COLLADA>\n");

    tracing::debug!(meshes = meshes.len(), materials = colors.len(), "Wrote COLLADA document");
    xml
}

fn write_geometry(xml: &mut String, index: usize, entity: &Entity, mesh: &MeshData) {
    let id = format!("geom-{}", index);
    let has_normals = !mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len();

    xml.push_str(&format!(
        "    <geometry id=\"{}\" name=\"{}\">\n      <mesh>\n",
        id,
        escape_xml(&entity.name)
    ));
    write_source(xml, &format!("{}-positions", id), &mesh.positions);
    if has_normals {
        write_source(xml, &format!("{}-normals", id), &mesh.normals);
    }

    xml.push_str(&format!(
        "        <vertices id=\"{id}-vertices\">\n          <input semantic=\"POSITION\" source=\"#{id}-positions\"/>\n",
        id = id
    ));
    if has_normals {
        xml.push_str(&format!(
            "          <input semantic=\"NORMAL\" source=\"#{}-normals\"/>\n",
            id
        ));
    }
    xml.push_str("        </vertices>\n");

    xml.push_str(&format!(
        r##"        <triangles count="{count}" material="material-{key}">
          <input semantic="VERTEX" source="#{id}-vertices" offset="0"/>
          <p>{indices}</p>
        </triangles>
      </mesh>
    </geometry>
"##,
        count = mesh.triangle_count(),
        key = entity.color_or_default().key(),
        id = id,
        indices = join_numbers(&mesh.triangles),
    ));
}

fn write_source(xml: &mut String, id: &str, values: &[f64]) {
    xml.push_str(&format!(
        r##"        <source id="{id}">
          <float_array id="{id}-array" count="{count}">{values}</float_array>
          <technique_common>
            <accessor source="#{id}-array" count="{vertices}" stride="3">
              <param name="X" type="float"/>
              <param name="Y" type="float"/>
              <param name="Z" type="float"/>
            </accessor>
          </technique_common>
        </source>
"##,
        id = id,
        count = values.len(),
        values = join_numbers(values),
        vertices = values.len() / 3,
    ));
}

fn write_node(xml: &mut String, index: usize, entity: &Entity) {
    let key = entity.color_or_default().key();
    xml.push_str(&format!(
        r##"      <node id="node-{index}" name="{name}">
        <instance_geometry url="#geom-{index}">
          <bind_material>
            <technique_common>
              <instance_material symbol="material-{key}" target="#material-{key}"/>
            </technique_common>
          </bind_material>
        </instance_geometry>
"##,
        index = index,
        name = escape_xml(&entity.name),
        key = key,
    ));

    if !entity.properties.is_empty() {
        xml.push_str(&format!(
            "        <extra>\n          <technique profile=\"{}\">\n            <user_properties>{}</user_properties>\n          </technique>\n        </extra>\n",
            WRITE_PROFILE,
            escape_xml(&format_user_properties(&entity.properties))
        ));
    }
    xml.push_str("      </node>\n");
}
