// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line arguments.

use anyhow::{bail, Context};
use std::path::PathBuf;

pub const USAGE: &str = "usage: c3ml <input> [--output <path>] [--format <json|kml|kmz|dae|gltf>] \
[--footprints] [--height <m>] [--altitude <m>]";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub footprints: bool,
    pub height: Option<f64>,
    pub altitude: Option<f64>,
}

impl Args {
    pub fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut args = args.into_iter();
        let mut parsed = Args::default();
        let mut input = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--output" | "-o" => parsed.output = Some(PathBuf::from(value(&mut args, &arg)?)),
                "--format" | "-f" => parsed.format = Some(value(&mut args, &arg)?),
                "--footprints" => parsed.footprints = true,
                "--height" => parsed.height = Some(number(&mut args, &arg)?),
                "--altitude" => parsed.altitude = Some(number(&mut args, &arg)?),
                "--help" | "-h" => bail!("{USAGE}"),
                flag if flag.starts_with('-') => bail!("Unknown option {flag}\n{USAGE}"),
                _ if input.is_some() => bail!("Unexpected argument {arg}\n{USAGE}"),
                _ => input = Some(PathBuf::from(arg)),
            }
        }

        parsed.input = input.with_context(|| format!("Missing input file\n{USAGE}"))?;
        Ok(parsed)
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> anyhow::Result<String> {
    args.next().with_context(|| format!("{flag} needs a value"))
}

fn number(args: &mut impl Iterator<Item = String>, flag: &str) -> anyhow::Result<f64> {
    let raw = value(args, flag)?;
    raw.parse()
        .with_context(|| format!("{flag} expects a number, got {raw}"))
}
