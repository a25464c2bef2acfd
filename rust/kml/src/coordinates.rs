// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `<coordinates>` text ↔ `[lat, lon, alt]` vertices.

use crate::error::{Error, Result};
use c3ml_core::Coordinate;

/// Parse whitespace separated `lon,lat[,alt]` tuples.
///
/// Whitespace next to a comma is tolerated; a missing altitude is 0.
pub fn parse_coordinates(text: &str) -> Result<Vec<Coordinate>> {
    let mut compact = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && c != ',' && !compact.is_empty() && !compact.ends_with(',') {
            compact.push(' ');
        }
        pending_space = false;
        compact.push(c);
    }

    compact
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(parse_tuple)
        .collect()
}

fn parse_tuple(tuple: &str) -> Result<Coordinate> {
    let values: Vec<f64> = tuple
        .split(',')
        .map(|v| {
            v.parse::<f64>()
                .map_err(|_| Error::unreadable(format!("invalid coordinate tuple '{}'", tuple)))
        })
        .collect::<Result<_>>()?;

    match values.as_slice() {
        [lon, lat] => Ok([*lat, *lon, 0.0]),
        [lon, lat, alt] => Ok([*lat, *lon, *alt]),
        _ => Err(Error::unreadable(format!(
            "coordinate tuple '{}' needs 2 or 3 values",
            tuple
        ))),
    }
}

/// Format vertices as `lon,lat,alt` tuples
pub fn format_coordinates(coordinates: &[Coordinate]) -> String {
    coordinates
        .iter()
        .map(|[lat, lon, alt]| format!("{},{},{}", lon, lat, alt))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lon_lat_order_is_swapped() {
        let coords = parse_coordinates("8.5,47.3,410 9,48").unwrap();
        assert_eq!(coords, vec![[47.3, 8.5, 410.0], [48.0, 9.0, 0.0]]);
    }

    #[test]
    fn test_loose_whitespace() {
        let coords = parse_coordinates("\n   1, 2, 3\n\t4 ,5 ,6   ").unwrap();
        assert_eq!(coords, vec![[2.0, 1.0, 3.0], [5.0, 4.0, 6.0]]);
    }

    #[test]
    fn test_empty_and_malformed() {
        assert!(parse_coordinates("  ").unwrap().is_empty());
        assert!(parse_coordinates("1").is_err());
        assert!(parse_coordinates("1,2,3,4").is_err());
        assert!(parse_coordinates("a,b").is_err());
    }

    #[test]
    fn test_format() {
        assert_eq!(format_coordinates(&[[47.5, 8.25, 0.0]]), "8.25,47.5,0");
    }
}
