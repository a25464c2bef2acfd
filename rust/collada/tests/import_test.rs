// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! COLLADA import/export integration tests

use approx::assert_relative_eq;
use c3ml_collada::{write_collada, ColladaImporter, Error, ImportOptions, ReferenceKind};
use c3ml_core::{Color, EntityType, GeoLocation};

const QUAD_GEOMETRY: &str = r##"
  <library_geometries>
    <geometry id="quad" name="Quad">
      <mesh>
        <source id="quad-pos">
          <float_array id="quad-pos-array" count="12">0 0 0 1 0 0 1 1 0 0 1 0</float_array>
          <technique_common><accessor source="#quad-pos-array" count="4" stride="3"/></technique_common>
        </source>
        <vertices id="quad-vtx"><input semantic="POSITION" source="#quad-pos"/></vertices>
        <triangles count="2" material="mat">
          <input semantic="VERTEX" source="#quad-vtx" offset="0"/>
          <p>0 1 2 0 2 3</p>
        </triangles>
      </mesh>
    </geometry>
  </library_geometries>"##;

const RED_MATERIAL: &str = r##"
  <library_effects>
    <effect id="red-fx"><profile_COMMON><technique sid="common"><phong>
      <diffuse><color>1 0 0 1</color></diffuse>
    </phong></technique></profile_COMMON></effect>
  </library_effects>
  <library_materials>
    <material id="red"><instance_effect url="#red-fx"/></material>
  </library_materials>"##;

fn document(asset: &str, libraries: &str, scene: &str) -> String {
    format!(
        r##"<?xml version="1.0" encoding="utf-8"?>
<COLLADA xmlns="http://www.collada.org/2005/11/COLLADASchema" version="1.4.1">
  <asset>{asset}</asset>
  {libraries}
  <library_visual_scenes><visual_scene id="scene">{scene}</visual_scene></library_visual_scenes>
  <scene><instance_visual_scene url="#scene"/></scene>
</COLLADA>"##
    )
}

fn import(xml: &str) -> c3ml_collada::Result<c3ml_core::EntityCollection> {
    ColladaImporter::new(ImportOptions::default()).import(xml.as_bytes())
}

const QUAD_INSTANCE: &str = r##"<instance_geometry url="#quad">
  <bind_material><technique_common>
    <instance_material symbol="mat" target="#red"/>
  </technique_common></bind_material>
</instance_geometry>"##;

#[test]
fn test_node_becomes_container_with_mesh() {
    let scene = format!(
        r#"<node id="building" name="Building">
             <translate>10 0 0</translate>
             {QUAD_INSTANCE}
             <extra><technique profile="OpenCOLLADA3dsMax">
               <user_properties>usage = office&#13;&#10;floors = 3</user_properties>
             </technique></extra>
           </node>"#
    );
    let xml = document(
        "<up_axis>Z_UP</up_axis>",
        &format!("{QUAD_GEOMETRY}{RED_MATERIAL}"),
        &scene,
    );
    let collection = import(&xml).unwrap();
    assert_eq!(collection.len(), 2);

    let building = collection.get("building").unwrap();
    assert_eq!(building.entity_type(), EntityType::Container);
    assert_eq!(building.name, "Building");
    assert_eq!(building.properties["usage"], "office");
    assert_eq!(building.properties["floors"], "3");

    let mesh_entity = collection.children("building").next().unwrap();
    assert_eq!(mesh_entity.name, "Quad");
    assert_eq!(mesh_entity.color, Some(Color::new(255, 0, 0, 255)));
    assert_eq!(mesh_entity.properties, building.properties);

    let mesh = mesh_entity.as_mesh().unwrap();
    assert_eq!(mesh.triangles, vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(mesh.triangles.len() % 3, 0);
    assert_relative_eq!(mesh.positions[0], 10.0, epsilon = 1e-9);
    assert_relative_eq!(mesh.positions[3], 11.0, epsilon = 1e-9);
    assert_eq!(mesh.geo_location, GeoLocation::default());
    assert_eq!(mesh.rotation, [0.0; 3]);
    assert_eq!(mesh.scale, [1.0; 3]);
}

#[test]
fn test_y_up_and_units_are_normalized() {
    let libraries = r##"
      <library_geometries><geometry id="g"><mesh>
        <source id="p"><float_array>0 0 0 0 100 0 100 0 0</float_array></source>
        <vertices id="v"><input semantic="POSITION" source="#p"/></vertices>
        <triangles count="1"><input semantic="VERTEX" source="#v" offset="0"/><p>0 1 2</p></triangles>
      </mesh></geometry></library_geometries>"##;
    let xml = document(
        r#"<unit meter="0.01"/><up_axis>Y_UP</up_axis>"#,
        libraries,
        r##"<node id="n"><instance_geometry url="#g"/></node>"##,
    );
    let collection = import(&xml).unwrap();
    let mesh = collection.children("n").next().unwrap().as_mesh().unwrap();

    // Authored +Y (100 cm) ends up as +Z (1 m)
    assert_relative_eq!(mesh.positions[3], 0.0, epsilon = 1e-9);
    assert_relative_eq!(mesh.positions[4], 0.0, epsilon = 1e-9);
    assert_relative_eq!(mesh.positions[5], 1.0, epsilon = 1e-9);
}

#[test]
fn test_unbound_material_defaults_to_white() {
    let xml = document(
        "",
        QUAD_GEOMETRY,
        r##"<node id="n"><instance_geometry url="#quad"/></node>"##,
    );
    let collection = import(&xml).unwrap();
    let mesh = collection.children("n").next().unwrap();
    assert_eq!(mesh.color_or_default(), Color::WHITE);
}

#[test]
fn test_missing_geometry_is_dangling_reference() {
    let xml = document(
        "",
        RED_MATERIAL,
        r##"<node id="a"/><node id="b"><instance_geometry url="#nowhere"/></node>"##,
    );
    match import(&xml) {
        Err(Error::DanglingReference { kind, id }) => {
            assert_eq!(kind, ReferenceKind::Geometry);
            assert_eq!(id, "nowhere");
        }
        other => panic!("expected a dangling reference, got {:?}", other.map(|c| c.len())),
    }
}

#[test]
fn test_missing_material_is_dangling_reference() {
    let scene = r##"<node id="n"><instance_geometry url="#quad">
        <bind_material><technique_common>
          <instance_material symbol="mat" target="#ghost"/>
        </technique_common></bind_material>
      </instance_geometry></node>"##;
    let xml = document("", QUAD_GEOMETRY, scene);
    assert!(matches!(
        import(&xml),
        Err(Error::DanglingReference {
            kind: ReferenceKind::Material,
            ..
        })
    ));
}

#[test]
fn test_library_node_instancing() {
    let libraries = format!(
        r##"{QUAD_GEOMETRY}{RED_MATERIAL}
        <library_nodes>
          <node id="tree" name="Tree">{QUAD_INSTANCE}</node>
        </library_nodes>"##
    );
    let scene = r##"<node id="park">
        <translate>0 0 5</translate>
        <instance_node url="#tree"/>
      </node>"##;
    let xml = document("<up_axis>Z_UP</up_axis>", &libraries, scene);
    let collection = import(&xml).unwrap();

    let tree = collection.children("park").next().unwrap();
    assert_eq!(tree.name, "Tree");
    let mesh = collection.children(&tree.id).next().unwrap().as_mesh().unwrap();
    assert_relative_eq!(mesh.positions[2], 5.0, epsilon = 1e-9);
}

#[test]
fn test_instancing_cycle_is_rejected() {
    let libraries = r##"<library_nodes>
        <node id="loop"><node id="inner"><instance_node url="#loop"/></node></node>
      </library_nodes>"##;
    let xml = document("", libraries, r##"<node id="root"><instance_node url="#loop"/></node>"##);
    assert!(matches!(import(&xml), Err(Error::CyclicInstance(id)) if id == "loop"));
}

#[test]
fn test_unsupported_primitives_are_skipped() {
    let libraries = r##"<library_geometries><geometry id="g"><mesh>
        <source id="p"><float_array>0 0 0 1 0 0 0 1 0</float_array></source>
        <vertices id="v"><input semantic="POSITION" source="#p"/></vertices>
        <lines count="1"><input semantic="VERTEX" source="#v" offset="0"/><p>0 1</p></lines>
      </mesh></geometry></library_geometries>"##;
    let xml = document("", libraries, r##"<node id="n"><instance_geometry url="#g"/></node>"##);
    let collection = import(&xml).unwrap();
    assert_eq!(collection.len(), 1);
}

#[test]
fn test_not_xml_is_an_error() {
    assert!(import("not a collada file").is_err());
    assert!(matches!(
        ColladaImporter::default().import(&[0xff, 0xfe, 0x00]),
        Err(Error::UnreadableInput(_))
    ));
}

#[test]
fn test_export_round_trip() {
    let scene = format!(
        r#"<node id="building" name="Building">
             {QUAD_INSTANCE}
             <extra><technique profile="C3ML"><user_properties>usage = office</user_properties></technique></extra>
           </node>"#
    );
    let xml = document("<up_axis>Z_UP</up_axis>", &format!("{QUAD_GEOMETRY}{RED_MATERIAL}"), &scene);
    let original = import(&xml).unwrap();
    let original_mesh = original.iter().find(|e| e.entity_type() == EntityType::Mesh).unwrap();

    let exported = write_collada(&original);
    let reloaded = import(&exported).unwrap();
    let mesh_entity = reloaded.iter().find(|e| e.entity_type() == EntityType::Mesh).unwrap();

    assert_eq!(mesh_entity.color, Some(Color::new(255, 0, 0, 255)));
    assert_eq!(mesh_entity.properties["usage"], "office");
    let (a, b) = (original_mesh.as_mesh().unwrap(), mesh_entity.as_mesh().unwrap());
    assert_eq!(a.triangles, b.triangles);
    for (x, y) in a.positions.iter().zip(&b.positions) {
        assert_relative_eq!(*x, *y, epsilon = 1e-9);
    }
}
