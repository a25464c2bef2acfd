// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity tree → KML 2.2 document.

use crate::coordinates::format_coordinates;
use crate::repair::KML_NAMESPACE;
use c3ml_core::xml::escape_xml;
use c3ml_core::{Color, Coordinate, Entity, EntityCollection, Geometry, Properties};
use c3ml_geometry::close_ring;
use rustc_hash::FxHashSet;

/// Output settings
#[derive(Debug, Clone, Default)]
pub struct KmlWriteOptions {
    /// `<name>` of the top `Document`
    pub document_name: Option<String>,
    /// When set, a `<Model>` placemark referencing this COLLADA href is
    /// written for the collection's meshes
    pub model_href: Option<String>,
}

/// Serialize a collection as one KML document.
///
/// Root entities become top-level features; Containers become Folders.
/// Mesh entities are only represented through the optional model
/// placemark; their children are written in their place.
pub fn write_kml(collection: &EntityCollection, options: &KmlWriteOptions) -> String {
    let mut writer = KmlWriter {
        collection,
        styles: Vec::new(),
        seen_styles: FxHashSet::default(),
        body: String::new(),
    };
    for root in collection.roots() {
        writer.feature(root, 2);
    }
    if let Some(href) = &options.model_href {
        writer.model_placemark(href);
    }

    let mut xml = String::new();
    xml.push_str(&format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<kml xmlns=\"{}\">\n  <Document>\n",
        KML_NAMESPACE
    ));
    if let Some(name) = &options.document_name {
        xml.push_str(&format!("    <name>{}</name>\n", escape_xml(name)));
    }
    for color in &writer.styles {
        let kml = color.to_kml_hex();
        xml.push_str(&format!(
            r#"    <Style id="{id}">
      <IconStyle><color>{kml}</color></IconStyle>
      <LineStyle><color>{kml}</color></LineStyle>
      <PolyStyle><color>{kml}</color></PolyStyle>
    </Style>
"#,
            id = style_id(color),
        ));
    }
    xml.push_str(&writer.body);
    xml.push_str("  </Document>\n</kml>\n");

    tracing::debug!(styles = writer.styles.len(), "Wrote KML document");
    xml
}

fn style_id(color: &Color) -> String {
    format!("style-{}", color.key())
}

struct KmlWriter<'c> {
    collection: &'c EntityCollection,
    /// Distinct colors in first-use order
    styles: Vec<Color>,
    seen_styles: FxHashSet<String>,
    body: String,
}

impl<'c> KmlWriter<'c> {
    /// Reference to the cached style for a color, creating it on first use
    fn style_url(&mut self, color: Color) -> String {
        if self.seen_styles.insert(color.key()) {
            self.styles.push(color);
        }
        format!("#{}", style_id(&color))
    }

    fn feature(&mut self, entity: &Entity, depth: usize) {
        let pad = "  ".repeat(depth);
        match &entity.geometry {
            Geometry::Container => {
                self.body.push_str(&format!(
                    "{pad}<Folder id=\"{}\">\n{pad}  <name>{}</name>\n",
                    escape_xml(&entity.id),
                    escape_xml(&entity.name),
                ));
                self.extended_data(&entity.properties, depth + 1);
                let collection = self.collection;
                for child in collection.children(&entity.id) {
                    self.feature(child, depth + 1);
                }
                self.body.push_str(&format!("{pad}</Folder>\n"));
            }
            Geometry::Mesh(_) => {
                tracing::debug!(entity = entity.id.as_str(), "Mesh geometry is written as COLLADA, writing children only");
                // Derived footprints hang below their mesh
                let collection = self.collection;
                for child in collection.children(&entity.id) {
                    self.feature(child, depth);
                }
            }
            geometry => {
                let style = self.style_url(entity.color_or_default());
                self.body.push_str(&format!(
                    "{pad}<Placemark id=\"{}\">\n{pad}  <name>{}</name>\n{pad}  <styleUrl>{}</styleUrl>\n",
                    escape_xml(&entity.id),
                    escape_xml(&entity.name),
                    style,
                ));
                self.extended_data(&entity.properties, depth + 1);
                let inner = "  ".repeat(depth + 1);
                self.body.push_str(&inner);
                self.body.push_str(&geometry_xml(geometry));
                self.body.push('\n');
                self.body.push_str(&format!("{pad}</Placemark>\n"));
            }
        }
    }

    fn extended_data(&mut self, properties: &Properties, depth: usize) {
        if properties.is_empty() {
            return;
        }
        let pad = "  ".repeat(depth);
        self.body.push_str(&format!("{pad}<ExtendedData>\n"));
        for (key, value) in properties {
            self.body.push_str(&format!(
                "{pad}  <Data name=\"{}\"><value>{}</value></Data>\n",
                escape_xml(key),
                escape_xml(value)
            ));
        }
        self.body.push_str(&format!("{pad}</ExtendedData>\n"));
    }

    /// Placemark for the first mesh's placement
    fn model_placemark(&mut self, href: &str) {
        let Some(mesh) = self.collection.iter().find_map(Entity::as_mesh) else {
            tracing::debug!("No mesh entities, model placemark omitted");
            return;
        };
        let geo = mesh.geo_location;
        let [tilt, roll, heading] = mesh.rotation;
        let [sx, sy, sz] = mesh.scale;
        self.body.push_str(&format!(
            r#"    <Placemark>
      <name>model</name>
      <Model>
        <altitudeMode>absolute</altitudeMode>
        <Location>
          <longitude>{}</longitude>
          <latitude>{}</latitude>
          <altitude>{}</altitude>
        </Location>
        <Orientation>
          <heading>{heading}</heading>
          <tilt>{tilt}</tilt>
          <roll>{roll}</roll>
        </Orientation>
        <Scale>
          <x>{sx}</x>
          <y>{sy}</y>
          <z>{sz}</z>
        </Scale>
        <Link><href>{}</href></Link>
      </Model>
    </Placemark>
"#,
            geo.longitude,
            geo.latitude,
            geo.altitude,
            escape_xml(href),
        ));
    }
}

fn geometry_xml(geometry: &Geometry) -> String {
    match geometry {
        Geometry::Point(coords) if coords.len() == 1 => point_xml(&coords[0]),
        Geometry::Point(coords) => format!(
            "<MultiGeometry>{}</MultiGeometry>",
            coords.iter().map(point_xml).collect::<String>()
        ),
        Geometry::Line(coords) => format!(
            "<LineString><coordinates>{}</coordinates></LineString>",
            format_coordinates(coords)
        ),
        Geometry::Polygon { outer, holes } => {
            let mut xml = format!(
                "<Polygon><outerBoundaryIs>{}</outerBoundaryIs>",
                ring_xml(outer)
            );
            for hole in holes {
                xml.push_str(&format!("<innerBoundaryIs>{}</innerBoundaryIs>", ring_xml(hole)));
            }
            xml.push_str("</Polygon>");
            xml
        }
        Geometry::Mesh(_) | Geometry::Container => String::new(),
    }
}

fn point_xml(coordinate: &Coordinate) -> String {
    format!(
        "<Point><coordinates>{}</coordinates></Point>",
        format_coordinates(std::slice::from_ref(coordinate))
    )
}

fn ring_xml(ring: &[Coordinate]) -> String {
    let mut closed = ring.to_vec();
    close_ring(&mut closed);
    format!(
        "<LinearRing><coordinates>{}</coordinates></LinearRing>",
        format_coordinates(&closed)
    )
}
