//! Reassembly of credentials split across a label → value table.
//!
//! A table entry contributes to group `g` when its label is exactly
//! `color-<g>-<n>` with `<n>` a decimal sequence number. Contributions are
//! ordered by `<n>` and concatenated after dropping one leading `#` from each
//! value. The table itself is user supplied (see `Config::credential_table`);
//! nothing here ships key material.

use std::collections::HashMap;

const LABEL_PREFIX: &str = "color-";
const VALUE_MARKER: char = '#';

/// Parse `color-<group>-<n>` into `(group, n)`.
///
/// The group is everything between the prefix and the last `-`, so group
/// identifiers may themselves contain dashes.
pub fn parse_label(label: &str) -> Option<(&str, u64)> {
    let rest = label.strip_prefix(LABEL_PREFIX)?;
    let (group, sequence) = rest.rsplit_once('-')?;
    if group.is_empty() || sequence.is_empty() {
        return None;
    }
    if !sequence.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let sequence = sequence.parse().ok()?;
    Some((group, sequence))
}

/// Rebuild the credential for one group. No matching labels yields an empty
/// string; callers treat that like any other key that the API rejects.
///
/// Labels with the same sequence number (`color-1-1`, `color-1-01`) are
/// ordered by label so the result does not depend on map iteration order.
pub fn resolve_group(table: &HashMap<String, String>, group: &str) -> String {
    let mut parts: Vec<(u64, &str, &str)> = table
        .iter()
        .filter_map(|(label, value)| match parse_label(label) {
            Some((g, seq)) if g == group => Some((seq, label.as_str(), value.as_str())),
            _ => None,
        })
        .collect();
    parts.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    parts
        .into_iter()
        .map(|(_, _, value)| value.strip_prefix(VALUE_MARKER).unwrap_or(value))
        .collect()
}

/// Resolve each group in order, one credential per group.
pub fn resolve_groups<S: AsRef<str>>(table: &HashMap<String, String>, groups: &[S]) -> Vec<String> {
    groups
        .iter()
        .map(|group| resolve_group(table, group.as_ref()))
        .collect()
}
