// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Custom node parameters stored in `<extra>` blocks.
//!
//! Authoring tools write free-form "user properties" as `key = value` lines:
//!
//! ```xml
//! <extra>
//!   <technique profile="OpenCOLLADA3dsMax">
//!     <user_properties>height = 12&#13;&#10;usage = office</user_properties>
//!   </technique>
//! </extra>
//! ```

use crate::document::{child, children_named};
use c3ml_core::Properties;
use roxmltree::Node;

/// Technique profiles whose `user_properties` are read
pub const KNOWN_PROFILES: &[&str] = &["OpenCOLLADA3dsMax", "OpenCOLLADAMaya", "FCOLLADA", "C3ML"];

/// Profile used when writing
pub const WRITE_PROFILE: &str = "OpenCOLLADA3dsMax";

/// Parse `key = value` lines. Blank lines are ignored, everything after the
/// first `=` is the value. Returns `None` if any line is malformed.
pub fn parse_user_properties(text: &str) -> Option<Properties> {
    let mut props = Properties::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        props.insert(key.to_string(), value.trim().to_string());
    }
    Some(props)
}

/// Format properties as `key = value` lines
pub fn format_user_properties(props: &Properties) -> String {
    props
        .iter()
        .map(|(k, v)| format!("{} = {}", k.trim(), v.replace(['\r', '\n'], " ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Custom parameters declared on a `<node>`.
///
/// A malformed block is logged and yields an empty map; it never fails the
/// import.
pub fn node_properties(node: Node) -> Properties {
    let mut props = Properties::new();
    for extra in children_named(node, "extra") {
        for technique in children_named(extra, "technique") {
            let known = technique
                .attribute("profile")
                .is_some_and(|p| KNOWN_PROFILES.contains(&p));
            if !known {
                continue;
            }
            let Some(text) = child(technique, "user_properties").and_then(|n| n.text()) else {
                continue;
            };
            match parse_user_properties(text) {
                Some(parsed) => props.extend(parsed),
                None => {
                    tracing::warn!(
                        node = node.attribute("id").unwrap_or_default(),
                        "Malformed user properties, ignoring them"
                    );
                    return Properties::new();
                }
            }
        }
    }
    props
}
