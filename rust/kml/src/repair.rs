// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Namespace repair pre-pass.
//!
//! Documents in the wild declare KML 2.0/2.1 namespaces, no namespace at
//! all, or use `Schema`-declared element names behind prefixes that were
//! never bound. Before parsing, the root element is moved into the KML 2.2
//! namespace and those schema elements lose their prefix so they land in
//! the same namespace.

use crate::error::{Error, Result};

pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// Rewrite namespaces as described in the module docs.
///
/// Fails when no `<kml>` root tag can be located; the caller is expected to
/// fall back to the original text.
pub fn repair_namespaces(text: &str) -> Result<String> {
    let start = find_tag(text, "kml", 0).ok_or_else(|| Error::unreadable("no <kml> root tag"))?;
    let end = text[start..]
        .find('>')
        .map(|i| start + i)
        .ok_or_else(|| Error::unreadable("unterminated <kml> tag"))?;

    let mut repaired = String::with_capacity(text.len() + KML_NAMESPACE.len() + 10);
    repaired.push_str(&text[..start]);
    repaired.push_str(&with_default_namespace(&text[start..end]));
    repaired.push_str(&text[end..]);

    for name in schema_names(&repaired) {
        repaired = strip_prefix_from_tags(&repaired, &name);
    }
    Ok(repaired)
}

/// Byte offset of the first `<name` start tag at or after `from`
fn find_tag(text: &str, name: &str, from: usize) -> Option<usize> {
    let needle = format!("<{}", name);
    let mut pos = from;
    while let Some(found) = text[pos..].find(&needle) {
        let at = pos + found;
        let after = text[at + needle.len()..].chars().next();
        if matches!(after, Some(c) if c.is_whitespace() || c == '>' || c == '/') {
            return Some(at);
        }
        pos = at + needle.len();
    }
    None
}

/// `<kml ...` start tag (without the closing `>`) with its default
/// namespace set to KML 2.2
fn with_default_namespace(tag: &str) -> String {
    for quote in ['"', '\''] {
        let attr = format!("xmlns={}", quote);
        if let Some(at) = tag.find(&attr) {
            let value_start = at + attr.len();
            if let Some(len) = tag[value_start..].find(quote) {
                return format!(
                    "{}{}{}",
                    &tag[..value_start],
                    KML_NAMESPACE,
                    &tag[value_start + len..]
                );
            }
        }
    }
    format!("<kml xmlns=\"{}\"{}", KML_NAMESPACE, &tag["<kml".len()..])
}

/// Values of `name` attributes on `<Schema>` tags
fn schema_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut pos = 0;
    while let Some(start) = find_tag(text, "Schema", pos) {
        let end = text[start..].find('>').map_or(text.len(), |i| start + i);
        if let Some(name) = attribute_value(&text[start..end], "name") {
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        pos = end;
    }
    names
}

fn attribute_value<'t>(tag: &'t str, name: &str) -> Option<&'t str> {
    for quote in ['"', '\''] {
        let attr = format!(" {}={}", name, quote);
        if let Some(at) = tag.find(&attr) {
            let value_start = at + attr.len();
            let len = tag[value_start..].find(quote)?;
            return Some(&tag[value_start..value_start + len]);
        }
    }
    None
}

/// Turn `<p:Name` / `</p:Name` into `<Name` / `</Name`
fn strip_prefix_from_tags(text: &str, name: &str) -> String {
    let needle = format!(":{}", name);
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;

    while let Some(found) = text[pos..].find(&needle) {
        let colon = pos + found;
        pos = colon + needle.len();

        let after = text[pos..].chars().next();
        if !matches!(after, Some(c) if c.is_whitespace() || c == '>' || c == '/') {
            continue;
        }
        let prefix_start = text[..colon]
            .char_indices()
            .rev()
            .find(|&(_, c)| !(c.is_alphanumeric() || c == '_' || c == '-' || c == '.'))
            .map_or(0, |(i, c)| i + c.len_utf8());
        if prefix_start == colon {
            continue;
        }
        let open = &text[..prefix_start];
        if open.ends_with('<') || open.ends_with("</") {
            out.push_str(&text[copied..prefix_start]);
            copied = colon + 1;
        }
    }
    out.push_str(&text[copied..]);
    out
}
