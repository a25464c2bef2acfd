// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for kernel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the geometry kernel
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid transform: {0}")]
    InvalidTransform(String),

    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),
}

impl Error {
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::InvalidTransform(msg.into())
    }

    pub fn mesh(msg: impl Into<String>) -> Self {
        Self::InvalidMesh(msg.into())
    }
}
