// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! KML document → entity tree.

use crate::coordinates::parse_coordinates;
use crate::error::{Error, Result};
use crate::repair::repair_namespaces;
use crate::style::{child_text, poly_color, StyleTables};
use c3ml_core::{Color, Coordinate, Entity, EntityCollection, Properties};
use c3ml_geometry::close_ring;
use roxmltree::{Document, Node, ParsingOptions};
use rustc_hash::FxHashMap;

/// Features that are recognized but produce no entities
const SKIPPED_FEATURES: &[&str] = &["NetworkLink", "GroundOverlay", "ScreenOverlay", "PhotoOverlay"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeatureKind {
    Document,
    Folder,
    Placemark,
}

impl FeatureKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Document" => Some(FeatureKind::Document),
            "Folder" => Some(FeatureKind::Folder),
            "Placemark" => Some(FeatureKind::Placemark),
            _ => None,
        }
    }
}

/// KML 2.1 `<Schema name=".." parent="..">` declaration
#[derive(Debug, Clone)]
struct CustomFeature {
    kind: FeatureKind,
    /// `SimpleField` names read as properties
    fields: Vec<String>,
}

/// Converts KML documents into entity collections
#[derive(Debug, Clone, Copy, Default)]
pub struct KmlImporter;

impl KmlImporter {
    pub fn new() -> Self {
        Self
    }

    /// Import a UTF-8 encoded document
    pub fn import(&self, bytes: &[u8]) -> Result<EntityCollection> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::unreadable(format!("document is not UTF-8: {}", e)))?;
        self.import_str(text)
    }

    pub fn import_str(&self, text: &str) -> Result<EntityCollection> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let repaired = match repair_namespaces(text) {
            Ok(repaired) => Some(repaired),
            Err(e) => {
                tracing::warn!(error = %e, "KML namespace repair failed, parsing original text");
                None
            }
        };
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(repaired.as_deref().unwrap_or(text), options)?;
        let root = doc.root_element();
        if !root.has_tag_name("kml") {
            return Err(Error::unreadable(format!(
                "root element is <{}>, expected <kml>",
                root.tag_name().name()
            )));
        }

        let top = root.children().find(|n| n.is_element());
        let styles = match top {
            Some(document) if document.has_tag_name("Document") => StyleTables::build(document),
            _ => StyleTables::default(),
        };

        let mut walker = FeatureWalker {
            styles: &styles,
            schemas: custom_features(root),
            collection: EntityCollection::new(),
        };
        for feature in root.children().filter(|n| n.is_element()) {
            walker.visit(feature, None)?;
        }

        let collection = walker.collection;
        collection.validate()?;
        tracing::info!(entities = collection.len(), "Imported KML document");
        Ok(collection)
    }
}

/// Import with default settings
pub fn import_kml(bytes: &[u8]) -> Result<EntityCollection> {
    KmlImporter::new().import(bytes)
}

fn custom_features(root: Node) -> FxHashMap<String, CustomFeature> {
    let mut schemas = FxHashMap::default();
    for schema in root.descendants().filter(|n| n.has_tag_name("Schema")) {
        let (Some(name), Some(parent)) = (schema.attribute("name"), schema.attribute("parent")) else {
            continue;
        };
        let Some(kind) = FeatureKind::from_tag(parent.trim()) else {
            tracing::debug!(schema = name, schema_parent = parent, "Schema parent is not a feature, ignoring");
            continue;
        };
        let fields = schema
            .children()
            .filter(|n| n.has_tag_name("SimpleField"))
            .filter_map(|f| f.attribute("name").map(str::to_string))
            .collect();
        schemas.insert(name.to_string(), CustomFeature { kind, fields });
    }
    schemas
}

struct FeatureWalker<'s> {
    styles: &'s StyleTables,
    schemas: FxHashMap<String, CustomFeature>,
    collection: EntityCollection,
}

impl<'s> FeatureWalker<'s> {
    fn visit(&mut self, node: Node, parent: Option<&str>) -> Result<()> {
        let tag = node.tag_name().name();
        let custom = self.schemas.get(tag).cloned();
        let kind = match FeatureKind::from_tag(tag).or(custom.as_ref().map(|c| c.kind)) {
            Some(kind) => kind,
            None => {
                if SKIPPED_FEATURES.contains(&tag) {
                    tracing::debug!(feature = tag, "Unsupported feature, skipping");
                }
                return Ok(());
            }
        };

        let mut properties = feature_properties(node);
        if let Some(custom) = &custom {
            for field in &custom.fields {
                if let Some(value) = child_text(node, field) {
                    properties.insert(field.clone(), value.trim().to_string());
                }
            }
        }
        let name = child_text(node, "name").map(str::trim).unwrap_or(tag).to_string();
        let preferred_id = node.attribute("id");

        match kind {
            FeatureKind::Document | FeatureKind::Folder => {
                let entity = Entity::container(name)
                    .with_id(self.collection.unique_id(preferred_id))
                    .with_properties(properties);
                let id = self.insert(parent, entity)?;
                for child in node.children().filter(|n| n.is_element()) {
                    self.visit(child, Some(&id))?;
                }
            }
            FeatureKind::Placemark => {
                let color = self.placemark_color(node);
                let Some(geometry) = node.children().find(|n| is_geometry(n.tag_name().name())) else {
                    tracing::debug!(placemark = name.as_str(), "Placemark without geometry, skipping");
                    return Ok(());
                };
                self.geometry(geometry, name, preferred_id, color, properties, parent)?;
            }
        }
        Ok(())
    }

    /// Inline `PolyStyle` first, then the `styleUrl` through the style
    /// tables, then white.
    fn placemark_color(&self, placemark: Node) -> Color {
        placemark
            .children()
            .find(|n| n.has_tag_name("Style"))
            .and_then(poly_color)
            .or_else(|| child_text(placemark, "styleUrl").and_then(|url| self.styles.resolve(url)))
            .unwrap_or(Color::WHITE)
    }

    fn geometry(
        &mut self,
        geometry: Node,
        name: String,
        preferred_id: Option<&str>,
        color: Color,
        properties: Properties,
        parent: Option<&str>,
    ) -> Result<()> {
        let tag = geometry.tag_name().name();
        let entity = match tag {
            "Point" => Entity::point(name, coordinates_of(geometry)?),
            "LineString" | "LinearRing" => Entity::line(name, coordinates_of(geometry)?),
            "Polygon" => {
                let mut outer = geometry
                    .children()
                    .find(|n| n.has_tag_name("outerBoundaryIs"))
                    .and_then(|b| b.children().find(|n| n.has_tag_name("LinearRing")))
                    .map(coordinates_of)
                    .transpose()?
                    .unwrap_or_default();
                close_ring(&mut outer);
                let holes = geometry
                    .children()
                    .filter(|n| n.has_tag_name("innerBoundaryIs"))
                    .count();
                if holes > 0 {
                    tracing::debug!(polygon = name.as_str(), holes, "Polygon holes are not imported");
                }
                Entity::polygon(name, outer, Vec::new())
            }
            "MultiGeometry" => {
                let entity = Entity::container(name.clone())
                    .with_id(self.collection.unique_id(preferred_id))
                    .with_color(color)
                    .with_properties(properties.clone());
                let id = self.insert(parent, entity)?;
                let parts = geometry.children().filter(|n| is_geometry(n.tag_name().name()));
                for (index, part) in parts.enumerate() {
                    let part_name = format!("{}_child_{}", name, index);
                    self.geometry(part, part_name, None, color, properties.clone(), Some(&id))?;
                }
                return Ok(());
            }
            _ => {
                tracing::debug!(geometry = tag, "Model geometry is not converted, skipping");
                return Ok(());
            }
        };

        let entity = entity
            .with_id(self.collection.unique_id(preferred_id))
            .with_color(color)
            .with_properties(properties);
        self.insert(parent, entity)?;
        Ok(())
    }

    fn insert(&mut self, parent: Option<&str>, entity: Entity) -> Result<String> {
        let id = match parent {
            Some(parent) => self.collection.insert_child(parent, entity)?,
            None => self.collection.insert(entity)?,
        };
        Ok(id)
    }
}

fn is_geometry(tag: &str) -> bool {
    matches!(
        tag,
        "Point" | "LineString" | "LinearRing" | "Polygon" | "MultiGeometry" | "Model"
    )
}

fn coordinates_of(geometry: Node) -> Result<Vec<Coordinate>> {
    match child_text(geometry, "coordinates") {
        Some(text) => parse_coordinates(text),
        None => Ok(Vec::new()),
    }
}

/// `<description>` and `<ExtendedData>` values of a feature
fn feature_properties(feature: Node) -> Properties {
    let mut props = Properties::new();
    if let Some(description) = child_text(feature, "description") {
        let description = description.trim();
        if !description.is_empty() {
            props.insert("description".to_string(), description.to_string());
        }
    }

    let Some(extended) = feature.children().find(|n| n.has_tag_name("ExtendedData")) else {
        return props;
    };
    for element in extended.children().filter(|n| n.is_element()) {
        match element.tag_name().name() {
            "Data" => {
                if let Some(name) = element.attribute("name") {
                    let value = child_text(element, "value").unwrap_or_default();
                    props.insert(name.to_string(), value.trim().to_string());
                }
            }
            "SchemaData" => {
                for simple in element.children().filter(|n| n.has_tag_name("SimpleData")) {
                    if let Some(name) = simple.attribute("name") {
                        props.insert(name.to_string(), simple.text().unwrap_or_default().trim().to_string());
                    }
                }
            }
            _ => {}
        }
    }
    props
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_properties() {
        let doc = roxmltree::Document::parse(
            r##"<Placemark>
                <description> corner shop </description>
                <ExtendedData>
                    <Data name="floors"><value>2</value></Data>
                    <SchemaData schemaUrl="#s"><SimpleData name="use">retail</SimpleData></SchemaData>
                </ExtendedData>
            </Placemark>"##,
        )
        .unwrap();
        let props = feature_properties(doc.root_element());
        assert_eq!(props.len(), 3);
        assert_eq!(props["description"], "corner shop");
        assert_eq!(props["floors"], "2");
        assert_eq!(props["use"], "retail");
    }

    #[test]
    fn test_geometry_tags() {
        assert!(is_geometry("Polygon"));
        assert!(is_geometry("Model"));
        assert!(!is_geometry("name"));
    }
}
