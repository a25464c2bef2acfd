// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for KML import/export
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a KML conversion
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unreadable KML input: {0}")]
    UnreadableInput(String),

    #[error("Malformed KML XML")]
    Xml(#[from] roxmltree::Error),

    #[error("Entity tree error")]
    Model(#[from] c3ml_core::Error),
}

impl Error {
    pub fn unreadable(msg: impl Into<String>) -> Self {
        Error::UnreadableInput(msg.into())
    }
}
