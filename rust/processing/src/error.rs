// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline errors and their classification.

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure classes reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input bytes could not be read as the declared format
    UnreadableInput,
    /// A cross-reference points at an id that does not exist
    DanglingReference,
    /// Transform data is malformed
    InvalidTransform,
    /// The produced entity tree violates an invariant
    InvalidModel,
    /// An external converter or service failed or is not configured
    ExternalTool,
}

/// Errors that abort a conversion
#[derive(Error, Debug)]
pub enum Error {
    #[error("COLLADA conversion failed")]
    Collada(#[from] c3ml_collada::Error),

    #[error("KML conversion failed")]
    Kml(#[from] c3ml_kml::Error),

    #[error("Invalid entity tree")]
    Model(#[from] c3ml_core::Error),

    #[error("Geometry kernel error")]
    Geometry(#[from] c3ml_geometry::Error),

    #[error("Unreadable input: {0}")]
    UnreadableInput(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid KMZ archive")]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid JSON")]
    Json(#[from] serde_json::Error),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("No {0} is configured")]
    MissingCollaborator(&'static str),

    #[error("External tool '{tool}' failed")]
    ExternalTool {
        tool: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl Error {
    pub fn unreadable(msg: impl Into<String>) -> Self {
        Error::UnreadableInput(msg.into())
    }

    pub fn external(
        tool: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Error::ExternalTool {
            tool: tool.into(),
            source: source.into(),
        }
    }

    /// Classify the failure
    pub fn kind(&self) -> ErrorKind {
        use c3ml_collada::Error as Collada;
        use c3ml_kml::Error as Kml;

        match self {
            Error::Collada(e) => match e {
                Collada::UnreadableInput(_) | Collada::Xml(_) => ErrorKind::UnreadableInput,
                Collada::DanglingReference { .. } => ErrorKind::DanglingReference,
                Collada::CyclicInstance(_) | Collada::Model(_) => ErrorKind::InvalidModel,
                Collada::Geometry(g) => geometry_kind(g),
            },
            Error::Kml(e) => match e {
                Kml::UnreadableInput(_) | Kml::Xml(_) => ErrorKind::UnreadableInput,
                Kml::Model(_) => ErrorKind::InvalidModel,
            },
            Error::Model(_) => ErrorKind::InvalidModel,
            Error::Geometry(g) => geometry_kind(g),
            Error::UnreadableInput(_)
            | Error::UnsupportedFormat(_)
            | Error::Archive(_)
            | Error::Json(_)
            | Error::Io(_) => ErrorKind::UnreadableInput,
            Error::MissingCollaborator(_) | Error::ExternalTool { .. } => ErrorKind::ExternalTool,
        }
    }
}

fn geometry_kind(error: &c3ml_geometry::Error) -> ErrorKind {
    match error {
        c3ml_geometry::Error::InvalidTransform(_) => ErrorKind::InvalidTransform,
        c3ml_geometry::Error::InvalidMesh(_) => ErrorKind::UnreadableInput,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_kinds() {
        let dangling: Error = c3ml_collada::Error::dangling(c3ml_collada::ReferenceKind::Geometry, "g").into();
        assert_eq!(dangling.kind(), ErrorKind::DanglingReference);

        let transform: Error = c3ml_collada::Error::Geometry(c3ml_geometry::Error::transform("bad")).into();
        assert_eq!(transform.kind(), ErrorKind::InvalidTransform);

        let kml: Error = c3ml_kml::Error::unreadable("x").into();
        assert_eq!(kml.kind(), ErrorKind::UnreadableInput);

        assert_eq!(Error::MissingCollaborator("IFC geometry service").kind(), ErrorKind::ExternalTool);
    }

    #[test]
    fn test_source_chain() {
        let err: Error = c3ml_collada::Error::dangling(c3ml_collada::ReferenceKind::Material, "m").into();
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "Dangling material reference: #m");

        let err = Error::external("ogr2ogr", "exit status 1");
        assert_eq!(err.kind(), ErrorKind::ExternalTool);
        assert_eq!(err.source().unwrap().to_string(), "exit status 1");
    }
}
