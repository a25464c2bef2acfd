// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Small helpers shared by the XML writers.

/// Escape text for use in XML element content or attribute values.
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Join numbers with single spaces, the list format of COLLADA arrays.
pub fn join_numbers<T: std::fmt::Display>(values: &[T]) -> String {
    let mut out = String::with_capacity(values.len() * 4);
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&v.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml(r#"a<b & "c"'"#), "a&lt;b &amp; &quot;c&quot;&#39;");
    }

    #[test]
    fn joins_numbers() {
        assert_eq!(join_numbers(&[1.5, 2.0, -3.0]), "1.5 2 -3");
        assert_eq!(join_numbers::<u32>(&[]), "");
    }
}
