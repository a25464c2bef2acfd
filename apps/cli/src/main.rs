// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! C3ML command-line converter.
//!
//! ```text
//! c3ml <input> [--output <path>] [--format <ext>] [--footprints]
//!      [--height <m>] [--altitude <m>]
//! ```
//!
//! The input format is taken from the file extension. The output format is
//! `--format`, else the extension of `--output`, else JSON. Defaults come
//! from `C3ML_*` environment variables, see [`config::Config`].

use anyhow::{bail, Context};
use c3ml_collada::ImportOptions;
use c3ml_processing::{
    read_kmz_entries, Conversion, Converter, InputFormat, OutputFormat, PipelineOptions, Resources,
};
use std::path::Path;

mod args;
mod config;
mod tools;

use args::Args;
use config::Config;
use tools::{Collada2GltfTool, OgrVectorTool};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info,c3ml=debug".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    let config = Config::from_env();
    tracing::debug!(?config, "Loaded configuration");

    run(&args, &config)
}

fn run(args: &Args, config: &Config) -> anyhow::Result<()> {
    let input_format = InputFormat::from_path(&args.input)
        .with_context(|| format!("Unsupported input format: {}", args.input.display()))?;
    let output_format = output_format(args)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension(output_format.extension()));

    if output == args.input {
        bail!("Output would overwrite the input file: {}", output.display());
    }

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let options = PipelineOptions {
        import: ImportOptions {
            geo_location: config.geo_location,
            ..Default::default()
        },
        derive_footprints: args.footprints || config.derive_footprints,
        target_height: args.height.or(config.target_height),
        target_altitude: args.altitude.or(config.target_altitude),
    };
    let converter = Converter::new(options)
        .with_vector_tool(OgrVectorTool::new(&config.vector_tool))
        .with_gltf_tool(Collada2GltfTool::new(&config.gltf_tool));

    let conversion = converter
        .convert(&bytes, input_format)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    let encoded = match conversion {
        Conversion::Entities(collection) => {
            let resources = side_files(&bytes, input_format);
            converter
                .export(&collection, output_format, &resources)
                .with_context(|| format!("Failed to export {}", output_format.extension()))?
        }
        Conversion::Ifc(value) => serde_json::to_vec_pretty(&value)?,
    };

    write_output(&output, &encoded)?;
    tracing::info!(output = %output.display(), bytes = encoded.len(), "Conversion finished");
    Ok(())
}

fn output_format(args: &Args) -> anyhow::Result<OutputFormat> {
    if let Some(ext) = &args.format {
        return OutputFormat::from_extension(ext).with_context(|| format!("Unsupported output format: {ext}"));
    }
    match args.output.as_deref().and_then(Path::extension) {
        Some(ext) => {
            let ext = ext.to_string_lossy();
            OutputFormat::from_extension(&ext).with_context(|| format!("Unsupported output format: {ext}"))
        }
        None => Ok(OutputFormat::default()),
    }
}

/// Images and models shipped inside a KMZ travel on to the exporters
fn side_files(bytes: &[u8], format: InputFormat) -> Resources {
    if format != InputFormat::Kmz {
        return Resources::new();
    }
    match read_kmz_entries(bytes) {
        Ok(mut entries) => {
            entries.retain(|name, _| {
                let lower = name.to_ascii_lowercase();
                !(lower.ends_with(".kml") || lower.ends_with(".dae"))
            });
            entries
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not read KMZ side files");
            Resources::new()
        }
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if path.exists() && path.is_dir() {
        bail!("Output path is a directory: {}", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}
