//! Labelled lines (`Empresa: Acme`) and section headers (`Requirements:`).

use std::collections::HashSet;

use crate::text::normalize;

/// If `line` opens with one of `markers`, return the text after it.
///
/// Accepts `Label: value`, `Label:` and a bare `Label` line. The returned
/// remainder is trimmed and may be empty.
pub fn marker_remainder<'a>(line: &'a str, markers: &HashSet<String>) -> Option<&'a str> {
    let line = line.trim();
    if let Some((label, rest)) = line.split_once(':') {
        if markers.contains(&normalize(label)) {
            return Some(rest.trim());
        }
    }
    markers.contains(&normalize(line)).then_some("")
}

/// Values introduced by a marker, in document order.
///
/// An empty inline value takes the next content line instead, unless that
/// line opens with any of `all_markers`, which must include `markers`.
pub fn marker_values(
    lines: &[&str],
    markers: &HashSet<String>,
    all_markers: &HashSet<String>,
) -> Vec<String> {
    let mut values = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let Some(rest) = marker_remainder(line, markers) else {
            continue;
        };
        if !rest.is_empty() {
            values.push(rest.to_string());
        } else if let Some(next) = lines.get(i + 1) {
            if marker_remainder(next, all_markers).is_none() {
                values.push(next.to_string());
            }
        }
    }
    values
}

/// Lines of the first section opened by a marker.
///
/// The section starts with the inline remainder of the header line, skips
/// blank lines right after the header and ends at the next blank line.
pub fn marker_section<'a>(text: &'a str, markers: &HashSet<String>) -> Option<Vec<&'a str>> {
    let mut lines = text.lines();
    let inline = loop {
        let line = lines.next()?;
        if let Some(rest) = marker_remainder(line, markers) {
            break rest;
        }
    };

    let mut section = Vec::new();
    if !inline.is_empty() {
        section.push(inline);
    }
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            if section.is_empty() {
                continue;
            }
            break;
        }
        section.push(line);
    }
    Some(section)
}
