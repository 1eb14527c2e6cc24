use jitvue_parser::scan::{find_closing, find_top_level, mask_literals, split_top_level};
use regex::Regex;
use std::collections::BTreeSet;
use tracing::debug;

/// Drop every entry of a `return { ... }` object literal whose key is in `names`.
///
/// Entries are split on top-level commas and values are filtered recursively,
/// so nested objects, calls and inner `return { ... }` literals are handled.
/// A literal that loses no entries is copied through unchanged.
pub fn filter_returns(script: &str, names: &BTreeSet<String>) -> String {
    if names.is_empty() {
        return script.to_string();
    }
    let masked = mask_literals(script);
    let return_re = Regex::new(r"\breturn\s*\{").unwrap();
    filter_span(script, &masked, names, &return_re)
}

fn filter_span(text: &str, masked: &str, names: &BTreeSet<String>, return_re: &Regex) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for m in return_re.find_iter(masked) {
        if m.start() < cursor {
            continue;
        }
        let open = m.end() - 1;
        let Some(close) = find_closing(masked, open) else {
            continue;
        };
        out.push_str(&text[cursor..=open]);
        out.push_str(&filter_object(
            &text[open + 1..close],
            &masked[open + 1..close],
            names,
            return_re,
        ));
        cursor = close;
    }

    out.push_str(&text[cursor..]);
    out
}

fn filter_object(
    content: &str,
    masked: &str,
    names: &BTreeSet<String>,
    return_re: &Regex,
) -> String {
    let mut kept = Vec::new();
    let mut dropped = false;

    for range in split_top_level(masked, b',') {
        let entry = &content[range.clone()];
        let entry_masked = &masked[range];
        let key_end = find_top_level(entry_masked, b':').unwrap_or(entry.len());
        let key = entry_masked[..key_end].trim();
        if names.contains(key) {
            debug!(key, "dropped nested-scope name from return object");
            dropped = true;
            continue;
        }
        kept.push(filter_span(entry, entry_masked, names, return_re));
    }

    let joined = kept.join(",");
    if !dropped {
        return joined;
    }

    let leading = &content[..content.len() - content.trim_start().len()];
    let trailing = &content[content.trim_end().len()..];
    format!("{leading}{}{trailing}", joined.trim())
}
