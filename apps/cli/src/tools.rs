// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Process-spawning implementations of the pipeline's external converters.
//!
//! Each call works in its own scratch directory that is removed when the
//! call returns.

use c3ml_processing::{ColladaToGltf, Error, GltfOutput, InputFormat, Resources, Result, VectorToKml};
use std::path::{Component, Path, PathBuf};
use std::process::Command;

/// Run `program` and turn a non-zero exit into an [`Error::ExternalTool`]
fn run(program: &str, command: &mut Command) -> Result<()> {
    tracing::debug!(?command, "Running external tool");
    let output = command.output().map_err(|e| Error::external(program, e))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::external(
            program,
            format!("{}: {}", output.status, stderr.trim()),
        ));
    }
    Ok(())
}

fn scratch_dir(program: &str) -> Result<tempfile::TempDir> {
    tempfile::Builder::new()
        .prefix("c3ml-")
        .tempdir()
        .map_err(|e| Error::external(program, e))
}

/// `ogr2ogr -f KML out.kml <input>`
#[derive(Debug, Clone)]
pub struct OgrVectorTool {
    program: String,
}

impl OgrVectorTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl VectorToKml for OgrVectorTool {
    fn to_kml(&self, input: &[u8], format: InputFormat) -> Result<Vec<u8>> {
        let dir = scratch_dir(&self.program)?;
        let input_path = dir.path().join(format!("input.{}", format.extension()));
        std::fs::write(&input_path, input)?;

        // Zipped shapefiles are read through GDAL's virtual zip file system
        let source = match format {
            InputFormat::Shapefile => format!("/vsizip/{}", input_path.display()),
            _ => input_path.display().to_string(),
        };
        let output_path = dir.path().join("output.kml");

        run(
            &self.program,
            Command::new(&self.program)
                .arg("-f")
                .arg("KML")
                .arg(&output_path)
                .arg(&source),
        )?;
        Ok(std::fs::read(&output_path)?)
    }
}

/// `COLLADA2GLTF-bin -i model.dae -o out/model.gltf`
#[derive(Debug, Clone)]
pub struct Collada2GltfTool {
    program: String,
}

impl Collada2GltfTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl ColladaToGltf for Collada2GltfTool {
    fn to_gltf(&self, collada: &[u8], resources: &Resources) -> Result<GltfOutput> {
        let dir = scratch_dir(&self.program)?;
        for (name, data) in resources {
            let path = resource_path(dir.path(), name)?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, data)?;
        }
        let input_path = dir.path().join("model.dae");
        std::fs::write(&input_path, collada)?;

        let out_dir = dir.path().join("out");
        std::fs::create_dir_all(&out_dir)?;
        let gltf_path = out_dir.join("model.gltf");

        run(
            &self.program,
            Command::new(&self.program)
                .arg("-i")
                .arg(&input_path)
                .arg("-o")
                .arg(&gltf_path),
        )?;

        let gltf = std::fs::read(&gltf_path)?;
        let mut files = Resources::new();
        for path in files_under(&out_dir)? {
            if path == gltf_path {
                continue;
            }
            if let Ok(relative) = path.strip_prefix(&out_dir) {
                let key = relative.to_string_lossy().replace('\\', "/");
                files.insert(key, std::fs::read(&path)?);
            }
        }
        tracing::debug!(files = files.len(), "Collected glTF side files");
        Ok(GltfOutput { gltf, files })
    }
}

/// Location of a resource inside `dir`. Names that could leave the
/// directory (absolute, `..`, drive prefixes) are rejected.
fn resource_path(dir: &Path, name: &str) -> Result<PathBuf> {
    let relative = Path::new(name);
    let contained = relative.components().next().is_some()
        && relative.components().all(|c| matches!(c, Component::Normal(_)));
    if !contained {
        return Err(Error::unreadable(format!("resource path escapes the work directory: {name}")));
    }
    Ok(dir.join(relative))
}

fn files_under(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }
    Ok(files)
}
