// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Self-contained glTF: relative image and buffer URIs are replaced with
//! base64 data URIs.

use crate::error::Result;
use crate::external::Resources;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

/// Rewrite the `uri` of every image (and buffer) that points at a file in
/// `files`. Data URIs and absolute URLs are left alone, as are references
/// to files that were not supplied.
pub fn embed_resources(gltf: &[u8], files: &Resources) -> Result<Vec<u8>> {
    let mut document: Value = serde_json::from_slice(gltf)?;
    let mut embedded = 0usize;

    for (array, default_mime) in [("images", None), ("buffers", Some("application/octet-stream"))] {
        let Some(items) = document.get_mut(array).and_then(Value::as_array_mut) else {
            continue;
        };
        for item in items {
            let Some(uri) = item.get("uri").and_then(Value::as_str) else {
                continue;
            };
            if !is_relative(uri) {
                continue;
            }
            let Some(data) = lookup(files, uri) else {
                tracing::warn!(uri, "Referenced glTF resource not found, keeping the relative URI");
                continue;
            };
            let mime = item
                .get("mimeType")
                .and_then(Value::as_str)
                .or(default_mime)
                .unwrap_or_else(|| mime_for(uri));
            let data_uri = format!("data:{};base64,{}", mime, STANDARD.encode(data));
            item["uri"] = Value::String(data_uri);
            embedded += 1;
        }
    }

    tracing::debug!(embedded, "Embedded glTF resources");
    Ok(serde_json::to_vec(&document)?)
}

fn is_relative(uri: &str) -> bool {
    !(uri.starts_with("data:") || uri.contains("://") || uri.starts_with('/'))
}

/// Exact path first, then by file name
fn lookup<'f>(files: &'f Resources, uri: &str) -> Option<&'f Vec<u8>> {
    let uri = uri.trim_start_matches("./");
    files.get(uri).or_else(|| {
        let name = uri.rsplit('/').next().unwrap_or(uri);
        files
            .iter()
            .find(|(path, _)| path.rsplit('/').next() == Some(name))
            .map(|(_, data)| data)
    })
}

fn mime_for(uri: &str) -> &'static str {
    let ext = uri.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ktx2" => "image/ktx2",
        _ => "application/octet-stream",
    }
}
