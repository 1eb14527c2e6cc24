use jitvue_parser::scan::{
    char_boundary_at_or_after, expression_end, find_closing, is_ident_byte, is_identifier,
    mask_literals, skip_whitespace,
};
use regex::Regex;
use std::collections::BTreeSet;
use std::ops::Range;
use tracing::trace;

/// How far back from a function-like match to look for `({ a, b }) =>`.
const DESTRUCTURE_LOOKBEHIND: usize = 50;

/// Words that look like `name(args) {` but open a statement block, not a method.
const BLOCK_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "with", "function", "return", "await",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// `function name(args) { ... }`, including anonymous and generator forms.
    Function,
    /// `(args) => { ... }`
    ArrowBlock,
    /// `(args) => expr`
    ArrowExpression,
    /// `name(args) { ... }` as in object and class methods.
    Method,
}

/// A function-like construct found in source text.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionBody {
    pub kind: FunctionKind,
    /// Where the match starts. For arrows this is the `=>` token.
    pub start: usize,
    /// The body text, without its braces.
    pub body: Range<usize>,
}

/// Collect every identifier declared or assigned inside some nested function
/// body of `source`, plus names destructured from arrow parameters.
///
/// The result is one flat set: a name declared in any nested body anywhere
/// counts, regardless of which function it belongs to. `<style>` blocks are
/// skipped.
pub fn collect_local_names(source: &str) -> BTreeSet<String> {
    let masked = mask_literals(&blank_style_blocks(source));
    let mut names = BTreeSet::new();

    for function in find_function_bodies(&masked) {
        collect_assigned_names(&masked[function.body.clone()], &mut names);
        collect_destructured_params(&masked, function.start, &mut names);
    }

    trace!(count = names.len(), ?names, "collected nested-scope names");
    names
}

/// Find every function-like construct in `masked` text, ordered by start.
pub fn find_function_bodies(masked: &str) -> Vec<FunctionBody> {
    let mut bodies = Vec::new();

    let function_re = Regex::new(r"\bfunction\b\s*\*?\s*(?:[A-Za-z_$][\w$]*)?\s*\(").unwrap();
    for m in function_re.find_iter(masked) {
        if let Some(body) = braced_body_after_params(masked, m.end() - 1) {
            bodies.push(FunctionBody {
                kind: FunctionKind::Function,
                start: m.start(),
                body,
            });
        }
    }

    for (arrow, _) in masked.match_indices("=>") {
        let after = skip_whitespace(masked, arrow + 2);
        if masked.as_bytes().get(after) == Some(&b'{') {
            if let Some(close) = find_closing(masked, after) {
                bodies.push(FunctionBody {
                    kind: FunctionKind::ArrowBlock,
                    start: arrow,
                    body: after + 1..close,
                });
            }
        } else {
            bodies.push(FunctionBody {
                kind: FunctionKind::ArrowExpression,
                start: arrow,
                body: after..expression_end(masked, after),
            });
        }
    }

    let method_re = Regex::new(r"([A-Za-z_$][\w$]*)\s*\(").unwrap();
    for cap in method_re.captures_iter(masked) {
        let m = cap.get(0).unwrap();
        let name = &cap[1];
        if BLOCK_KEYWORDS.contains(&name) {
            continue;
        }
        if m.start() > 0 && is_ident_byte(masked.as_bytes()[m.start() - 1]) {
            continue;
        }
        if masked[..m.start()].trim_end().ends_with("function") {
            continue;
        }
        if let Some(body) = braced_body_after_params(masked, m.end() - 1) {
            bodies.push(FunctionBody {
                kind: FunctionKind::Method,
                start: m.start(),
                body,
            });
        }
    }

    bodies.sort_by_key(|b| b.start);
    bodies
}

/// Replace `<style>` blocks with spaces, keeping newlines and byte offsets.
fn blank_style_blocks(source: &str) -> String {
    let style_re = Regex::new(r"(?s)<style\b[^>]*>.*?</style>").unwrap();
    style_re
        .replace_all(source, |cap: &regex::Captures| {
            cap[0]
                .bytes()
                .map(|b| if b == b'\n' { '\n' } else { ' ' })
                .collect::<String>()
        })
        .into_owned()
}

/// Given the `(` of a parameter list, return the range inside the `{ ... }`
/// that directly follows its `)`, allowing a TS return type in between.
fn braced_body_after_params(masked: &str, paren: usize) -> Option<Range<usize>> {
    let close_paren = find_closing(masked, paren)?;
    let mut brace = skip_whitespace(masked, close_paren + 1);
    if masked.as_bytes().get(brace) == Some(&b':') {
        let return_type_re = Regex::new(r"^:[ \t]*[A-Za-z_$][\w$.<>\[\]|&, \t]*\{").unwrap();
        let m = return_type_re.find(&masked[brace..])?;
        brace += m.end() - 1;
    }
    if masked.as_bytes().get(brace) != Some(&b'{') {
        return None;
    }
    let close_brace = find_closing(masked, brace)?;
    Some(brace + 1..close_brace)
}

/// Add `var|let|const name =` declarations and bare `name =` assignments.
///
/// `name ==` and `name ===` are comparisons and are skipped, as are property
/// assignments like `obj.name =`.
fn collect_assigned_names(body: &str, names: &mut BTreeSet<String>) {
    let decl_re = Regex::new(r"\b(?:var|let|const)\s+([A-Za-z_$][\w$]*)\s*=").unwrap();
    for cap in decl_re.captures_iter(body) {
        names.insert(cap[1].to_string());
    }

    let bytes = body.as_bytes();
    let assign_re = Regex::new(r"([A-Za-z_$][\w$]*)\s*=").unwrap();
    for cap in assign_re.captures_iter(body) {
        let m = cap.get(0).unwrap();
        if m.start() > 0 {
            let prev = bytes[m.start() - 1];
            if is_ident_byte(prev) || prev == b'.' {
                continue;
            }
        }
        if bytes.get(m.end()) == Some(&b'=') {
            continue;
        }
        names.insert(cap[1].to_string());
    }
}

/// Look just before `start` for an arrow parameter destructure
/// `({ a, b: alias, c = 1, ...rest })` and add the property names.
fn collect_destructured_params(masked: &str, start: usize, names: &mut BTreeSet<String>) {
    let window_start = char_boundary_at_or_after(masked, start.saturating_sub(DESTRUCTURE_LOOKBEHIND));
    let window = &masked[window_start..start];
    let destructure_re = Regex::new(r"\(\s*\{([^{}]*)\}\s*(?::[^(){}=]*)?\)\s*$").unwrap();

    let Some(cap) = destructure_re.captures(window) else {
        return;
    };
    for part in cap[1].split(',') {
        let name = part.split(':').next().unwrap_or("");
        let name = name.split('=').next().unwrap_or("").trim();
        let name = name.trim_start_matches("...").trim();
        if is_identifier(name) {
            names.insert(name.to_string());
        }
    }
}
