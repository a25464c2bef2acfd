// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline integration tests: bytes in, entity tree out

use approx::abs_diff_eq;
use c3ml_collada::ImportOptions;
use c3ml_core::{Color, EntityType, GeoLocation, Geometry};
use c3ml_geometry::to_geodetic;
use c3ml_processing::{
    read_kmz_entries, write_kmz, Conversion, Converter, ErrorKind, InputFormat, OutputFormat,
    PipelineOptions, Resources, VectorToKml, KMZ_DOCUMENT,
};

const FLAT_QUAD: &str = r##"<?xml version="1.0" encoding="utf-8"?>
<COLLADA xmlns="http://www.collada.org/2005/11/COLLADASchema" version="1.4.1">
  <asset><unit meter="1"/><up_axis>Z_UP</up_axis></asset>
  <library_geometries>
    <geometry id="quad">
      <mesh>
        <source id="quad-pos">
          <float_array id="quad-pos-array" count="12">0 0 0 10 0 0 10 10 0 0 10 0</float_array>
          <technique_common><accessor source="#quad-pos-array" count="4" stride="3"/></technique_common>
        </source>
        <vertices id="quad-vtx"><input semantic="POSITION" source="#quad-pos"/></vertices>
        <triangles count="2">
          <input semantic="VERTEX" source="#quad-vtx" offset="0"/>
          <p>0 1 2 0 2 3</p>
        </triangles>
      </mesh>
    </geometry>
  </library_geometries>
  <library_visual_scenes>
    <visual_scene id="scene">
      <node id="plate" name="Plate"><instance_geometry url="#GEOMETRY"/></node>
    </visual_scene>
  </library_visual_scenes>
  <scene><instance_visual_scene url="#scene"/></scene>
</COLLADA>"##;

fn quad_document(geometry_url: &str) -> String {
    FLAT_QUAD.replace("GEOMETRY", geometry_url)
}

const STYLED_KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark id="lot">
      <name>Lot</name>
      <Style><PolyStyle><color>ff0000ff</color></PolyStyle></Style>
      <Polygon><outerBoundaryIs><LinearRing>
        <coordinates>8,47,0 8.001,47,0 8.001,47.001,0</coordinates>
      </LinearRing></outerBoundaryIs></Polygon>
    </Placemark>
  </Document>
</kml>"#;

fn entities(conversion: Conversion) -> c3ml_core::EntityCollection {
    conversion.into_entities().expect("conversion produced entities")
}

#[test]
fn test_flat_quad_yields_one_footprint() {
    let options = PipelineOptions {
        import: ImportOptions {
            geo_location: Some(GeoLocation::new(0.0, 0.0, 0.0)),
            ..Default::default()
        },
        derive_footprints: true,
        ..Default::default()
    };
    let conversion = Converter::new(options)
        .convert(quad_document("quad").as_bytes(), InputFormat::Collada)
        .unwrap();
    let collection = entities(conversion);

    let footprints: Vec<_> = collection
        .iter()
        .filter(|e| e.entity_type() == EntityType::Polygon)
        .collect();
    assert_eq!(footprints.len(), 1);

    let Geometry::Polygon { outer, holes } = &footprints[0].geometry else {
        panic!("footprint is not a polygon");
    };
    assert!(holes.is_empty());
    assert_eq!(outer.len(), 5);
    assert_eq!(outer.first(), outer.last());

    for (x, y) in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)] {
        let expected = to_geodetic(x, y, 0.0, 0.0, 0.0, 0.0);
        let found = outer.iter().any(|c| {
            (0..3).all(|i| abs_diff_eq!(c[i], expected[i], epsilon = 1e-9))
        });
        assert!(found, "corner ({x}, {y}) missing from footprint");
    }
}

#[test]
fn test_height_then_footprint_order() {
    let options = PipelineOptions {
        target_altitude: Some(50.0),
        derive_footprints: true,
        ..Default::default()
    };
    let collection = entities(
        Converter::new(options)
            .convert(quad_document("quad").as_bytes(), InputFormat::Collada)
            .unwrap(),
    );
    let footprint = collection
        .iter()
        .find(|e| e.entity_type() == EntityType::Polygon)
        .unwrap();
    assert!(footprint.geometry.coordinates().iter().all(|c| abs_diff_eq!(c[2], 50.0, epsilon = 1e-9)));
}

#[test]
fn test_footprints_survive_kml_and_kmz_export() {
    let options = PipelineOptions {
        derive_footprints: true,
        ..Default::default()
    };
    let converter = Converter::new(options);
    let collection = entities(
        converter
            .convert(quad_document("quad").as_bytes(), InputFormat::Collada)
            .unwrap(),
    );

    let kml = converter
        .export(&collection, OutputFormat::Kml, &Resources::new())
        .unwrap();
    assert_eq!(String::from_utf8(kml).unwrap().matches("<Polygon>").count(), 1);

    let kmz = converter
        .export(&collection, OutputFormat::Kmz, &Resources::new())
        .unwrap();
    let doc = read_kmz_entries(&kmz).unwrap().remove(KMZ_DOCUMENT).unwrap();
    assert_eq!(String::from_utf8(doc).unwrap().matches("<Polygon>").count(), 1);
}

#[test]
fn test_dangling_geometry_aborts() {
    let err = Converter::default()
        .convert(quad_document("missing").as_bytes(), InputFormat::Collada)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DanglingReference);
}

#[test]
fn test_kml_inline_poly_style() {
    let collection = entities(
        Converter::default()
            .convert(STYLED_KML.as_bytes(), InputFormat::Kml)
            .unwrap(),
    );
    let lot = collection.get("lot").unwrap();
    assert_eq!(lot.entity_type(), EntityType::Polygon);
    assert_eq!(lot.color, Some(Color::new(255, 0, 0, 255)));
}

#[test]
fn test_kmz_input() {
    let kml = entities(
        Converter::default()
            .convert(STYLED_KML.as_bytes(), InputFormat::Kml)
            .unwrap(),
    );
    let kmz = write_kmz(&kml, Some("lots"), &Resources::new()).unwrap();
    assert!(read_kmz_entries(&kmz).unwrap().contains_key(KMZ_DOCUMENT));

    let reloaded = entities(Converter::default().convert(&kmz, InputFormat::Kmz).unwrap());
    let lot = reloaded
        .iter()
        .find(|e| e.entity_type() == EntityType::Polygon)
        .unwrap();
    assert_eq!(lot.color, Some(Color::new(255, 0, 0, 255)));
}

struct GeoJsonAsKml;

impl VectorToKml for GeoJsonAsKml {
    fn to_kml(&self, input: &[u8], format: InputFormat) -> c3ml_processing::Result<Vec<u8>> {
        assert_eq!(format, InputFormat::GeoJson);
        assert!(input.starts_with(b"{"));
        Ok(STYLED_KML.as_bytes().to_vec())
    }
}

#[test]
fn test_geojson_through_vector_tool() {
    let converter = Converter::default().with_vector_tool(GeoJsonAsKml);
    let collection = entities(
        converter
            .convert(br#"{"type":"FeatureCollection","features":[]}"#, InputFormat::GeoJson)
            .unwrap(),
    );
    assert!(collection.contains("lot"));
}

#[test]
fn test_unreadable_inputs() {
    let converter = Converter::default();
    let err = converter.convert(b"not xml", InputFormat::Kml).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnreadableInput);
    let err = converter.convert(b"not a zip", InputFormat::Kmz).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnreadableInput);
}

#[test]
fn test_collada_export_reimports() {
    let converter = Converter::default();
    let collection = entities(
        converter
            .convert(quad_document("quad").as_bytes(), InputFormat::Collada)
            .unwrap(),
    );
    let dae = converter
        .export(&collection, OutputFormat::Collada, &Resources::new())
        .unwrap();
    let reloaded = entities(converter.convert(&dae, InputFormat::Collada).unwrap());
    let meshes = reloaded.iter().filter(|e| e.entity_type() == EntityType::Mesh).count();
    assert_eq!(meshes, 1);
}
