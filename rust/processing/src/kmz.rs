// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! KMZ archives: a zipped KML document plus the models and images it
//! references.

use crate::error::{Error, Result};
use crate::external::Resources;
use c3ml_collada::write_collada;
use c3ml_core::EntityCollection;
use c3ml_kml::{write_kml, KmlWriteOptions};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Main document entry
pub const KMZ_DOCUMENT: &str = "doc.kml";
/// COLLADA entry written when the collection has meshes
pub const KMZ_MODEL: &str = "models/model.dae";

/// The KML document of a KMZ: `doc.kml`, else the first `.kml` entry.
pub fn read_kmz(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let name = if archive.file_names().any(|n| n == KMZ_DOCUMENT) {
        KMZ_DOCUMENT.to_string()
    } else {
        archive
            .file_names()
            .find(|n| n.to_ascii_lowercase().ends_with(".kml"))
            .ok_or_else(|| Error::unreadable("KMZ archive contains no .kml document"))?
            .to_owned()
    };

    tracing::debug!(entry = name.as_str(), "Reading KML from KMZ");
    let mut entry = archive.by_name(&name)?;
    let mut kml = Vec::new();
    entry.read_to_end(&mut kml)?;
    Ok(kml)
}

/// All non-directory entries of a KMZ, keyed by path. Entries whose path
/// would leave the archive root are skipped.
pub fn read_kmz_entries(bytes: &[u8]) -> Result<Resources> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Resources::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        if entry.enclosed_name().is_none() {
            tracing::warn!(entry = entry.name(), "KMZ entry path leaves the archive, skipping");
            continue;
        }
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        entries.insert(entry.name().to_string(), data);
    }
    Ok(entries)
}

/// Package a collection as KMZ.
///
/// The archive holds `doc.kml`, `models/model.dae` when any Mesh exists
/// (referenced from a model placemark in the KML), and `resources` under
/// their own paths.
pub fn write_kmz(
    collection: &EntityCollection,
    document_name: Option<&str>,
    resources: &Resources,
) -> Result<Vec<u8>> {
    let has_mesh = collection.iter().any(|e| e.as_mesh().is_some());
    let options = KmlWriteOptions {
        document_name: document_name.map(str::to_string),
        model_href: has_mesh.then(|| KMZ_MODEL.to_string()),
    };

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let file_options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(KMZ_DOCUMENT, file_options)?;
    zip.write_all(write_kml(collection, &options).as_bytes())?;

    if has_mesh {
        zip.start_file(KMZ_MODEL, file_options)?;
        zip.write_all(write_collada(collection).as_bytes())?;
    }

    for (name, data) in resources {
        if name == KMZ_DOCUMENT || name == KMZ_MODEL {
            tracing::warn!(entry = name.as_str(), "Resource collides with a generated KMZ entry, skipping");
            continue;
        }
        zip.start_file(name.as_str(), file_options)?;
        zip.write_all(data)?;
    }

    let archive = zip.finish()?.into_inner();
    tracing::info!(
        bytes = archive.len(),
        model = has_mesh,
        resources = resources.len(),
        "Wrote KMZ archive"
    );
    Ok(archive)
}
