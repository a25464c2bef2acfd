// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for entity tree operations.

/// Result type alias for entity tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or loading an entity tree.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An entity with this id already exists in the collection.
    #[error("duplicate entity id: {0}")]
    DuplicateId(String),

    /// A referenced entity id is not in the collection.
    #[error("entity not found: {0}")]
    UnknownEntity(String),

    /// Linking would make an entity its own ancestor.
    #[error("cyclic parent/child link: {child} cannot be a child of {parent}")]
    CyclicReference { parent: String, child: String },

    /// The child already hangs below another parent.
    #[error("entity {child} already has parent {parent}")]
    AlreadyParented { child: String, parent: String },

    /// Entity content breaks a tree or geometry invariant.
    #[error("invalid entity {id}: {reason}")]
    InvalidEntity { id: String, reason: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub(crate) fn invalid(id: &str, reason: impl Into<String>) -> Self {
        Error::InvalidEntity {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
