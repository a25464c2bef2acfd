// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Style resolution: `Style` and `StyleMap` indirection → concrete colors.

use c3ml_core::Color;
use roxmltree::Node;
use rustc_hash::FxHashMap;

/// Sub-style scan order when a shared style is reduced to one color.
/// Each entry lists the color-carrying children tried in order.
const SUB_STYLES: &[(&str, &[&str])] = &[
    ("PolyStyle", &["color"]),
    ("LabelStyle", &["color"]),
    ("LineStyle", &["color"]),
    ("ListStyle", &["bgColor"]),
    ("BalloonStyle", &["bgColor", "color"]),
    ("IconStyle", &["color"]),
];

/// Colors of a `StyleMap`'s pairs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleMapColors {
    pub normal: Option<Color>,
    pub highlight: Option<Color>,
}

/// Per-document lookup tables
#[derive(Debug, Default)]
pub struct StyleTables {
    /// styleId → color
    styles: FxHashMap<String, Color>,
    /// styleMapId → pair colors
    style_maps: FxHashMap<String, StyleMapColors>,
}

impl StyleTables {
    /// Collect shared styles below a `Document`
    pub fn build(document: Node) -> Self {
        let mut tables = StyleTables::default();

        for style in document.descendants().filter(|n| n.has_tag_name("Style")) {
            if let (Some(id), Some(color)) = (style.attribute("id"), style_color(style)) {
                tables.styles.insert(id.to_string(), color);
            }
        }

        for map in document.descendants().filter(|n| n.has_tag_name("StyleMap")) {
            let Some(id) = map.attribute("id") else {
                continue;
            };
            let mut colors = StyleMapColors::default();
            for pair in map.children().filter(|n| n.has_tag_name("Pair")) {
                let color = pair_color(pair, &tables.styles);
                match child_text(pair, "key").map(str::trim) {
                    Some("normal") => colors.normal = color,
                    Some("highlight") => colors.highlight = color,
                    _ => {}
                }
            }
            tables.style_maps.insert(id.to_string(), colors);
        }

        tracing::debug!(
            styles = tables.styles.len(),
            style_maps = tables.style_maps.len(),
            "Built KML style tables"
        );
        tables
    }

    /// Resolve a `styleUrl`: style maps first (normal pair), then styles
    pub fn resolve(&self, url: &str) -> Option<Color> {
        let id = style_id(url);
        self.style_maps
            .get(id)
            .and_then(|m| m.normal)
            .or_else(|| self.styles.get(id).copied())
    }

    pub fn style_map(&self, id: &str) -> Option<&StyleMapColors> {
        self.style_maps.get(style_id(id))
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.style_maps.is_empty()
    }
}

/// Fragment of a style URL: `#id` and `doc.kml#id` both give `id`
pub fn style_id(url: &str) -> &str {
    let url = url.trim();
    url.rsplit_once('#').map_or(url, |(_, id)| id)
}

/// First populated color of a `Style`, in sub-style order
pub fn style_color(style: Node) -> Option<Color> {
    SUB_STYLES.iter().find_map(|(sub_style, fields)| {
        let sub = style.children().find(|n| n.has_tag_name(*sub_style))?;
        fields
            .iter()
            .find_map(|field| child_text(sub, field).and_then(Color::from_kml_hex))
    })
}

/// `PolyStyle` color of a `Style`
pub fn poly_color(style: Node) -> Option<Color> {
    let poly = style.children().find(|n| n.has_tag_name("PolyStyle"))?;
    child_text(poly, "color").and_then(Color::from_kml_hex)
}

fn pair_color(pair: Node, styles: &FxHashMap<String, Color>) -> Option<Color> {
    if let Some(inline) = pair.children().find(|n| n.has_tag_name("Style")) {
        return style_color(inline);
    }
    child_text(pair, "styleUrl").and_then(|url| styles.get(style_id(url)).copied())
}

pub(crate) fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children().find(|n| n.has_tag_name(name))?.text()
}
