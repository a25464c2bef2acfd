// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use thiserror::Error;

/// Result type for COLLADA import/export
pub type Result<T> = std::result::Result<T, Error>;

/// Library a dangling id was looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Geometry,
    Material,
    Effect,
    Node,
    VisualScene,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::Geometry => "geometry",
            ReferenceKind::Material => "material",
            ReferenceKind::Effect => "effect",
            ReferenceKind::Node => "node",
            ReferenceKind::VisualScene => "visual scene",
        };
        f.write_str(name)
    }
}

/// Errors that abort a COLLADA conversion
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unreadable COLLADA input: {0}")]
    UnreadableInput(String),

    #[error("Malformed COLLADA XML")]
    Xml(#[from] roxmltree::Error),

    #[error("Dangling {kind} reference: #{id}")]
    DanglingReference { kind: ReferenceKind, id: String },

    #[error("Node #{0} instances itself")]
    CyclicInstance(String),

    #[error("Geometry kernel error")]
    Geometry(#[from] c3ml_geometry::Error),

    #[error("Entity tree error")]
    Model(#[from] c3ml_core::Error),
}

impl Error {
    pub fn unreadable(msg: impl Into<String>) -> Self {
        Error::UnreadableInput(msg.into())
    }

    pub fn dangling(kind: ReferenceKind, id: &str) -> Self {
        Error::DanglingReference {
            kind,
            id: id.to_string(),
        }
    }
}
