use jitvue_parser::scan::{depth_at, is_identifier, mask_literals};
use jitvue_parser::{parse_blocks, parse_script_imports, ScriptImport};
use regex::Regex;

use crate::JitError;

/// The variable the compiled script stores component options in.
pub const COMPONENT_BINDING: &str = "__component__";

const IMPORT_TEMP_PREFIX: &str = "__import_";

/// Compiled form of a single-file component: one script that, run as a
/// function body, returns the component options object.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSfc {
    pub script: String,
}

/// Turns component source into a compiled script.
pub trait ComponentCompiler {
    fn compile(&self, source: &str) -> Result<CompiledSfc, JitError>;
}

impl<C: ComponentCompiler + ?Sized> ComponentCompiler for Box<C> {
    fn compile(&self, source: &str) -> Result<CompiledSfc, JitError> {
        (**self).compile(source)
    }
}

/// A script compiled elsewhere, handed through as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Precompiled(pub String);

impl ComponentCompiler for Precompiled {
    fn compile(&self, _source: &str) -> Result<CompiledSfc, JitError> {
        Ok(CompiledSfc {
            script: self.0.clone(),
        })
    }
}

/// Built-in compiler for `<template>` + `<script>` / `<script setup>` sources.
///
/// Output layout:
///
/// ```text
/// const __import_0 = require('vue')        // imports become require lines
/// const { ref } = __import_0
/// const __component__ = { ... }            // from `export default`
/// __component__.setup = function setup() { // from <script setup>
///   ...
///   return { ref, count }
/// }
/// __component__.template = "<p>...</p>"
/// return __component__;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SfcCompiler;

impl ComponentCompiler for SfcCompiler {
    fn compile(&self, source: &str) -> Result<CompiledSfc, JitError> {
        let blocks = parse_blocks(source);
        if blocks.template.is_none() && blocks.script.is_none() && blocks.script_setup.is_none() {
            return Err(JitError::Compile(
                "no <template> or <script> block found".to_string(),
            ));
        }
        if let Some(lang) = blocks.script_lang.as_deref().filter(|lang| *lang != "js") {
            return Err(JitError::Compile(format!(
                "<script lang=\"{lang}\"> needs an external compiler"
            )));
        }

        let mut counter = 0;
        let mut out = String::new();

        let exported = match &blocks.script {
            Some(script) => {
                let body = strip_named_exports(&rewrite_imports(script, &mut counter));
                let (body, exported) = rewrite_default_export(&body);
                out.push_str(&body);
                out.push('\n');
                exported
            }
            None => false,
        };
        if !exported {
            out.push_str(&format!("const {COMPONENT_BINDING} = {{}}\n"));
        }

        if let Some(setup) = &blocks.script_setup {
            let body = rewrite_imports(setup, &mut counter);
            let exposed = top_level_bindings(&body);
            out.push_str(&format!("{COMPONENT_BINDING}.setup = function setup() {{\n"));
            out.push_str(&body);
            out.push('\n');
            out.push_str(&format!("return {{ {} }}\n}}\n", exposed.join(", ")));
        }

        if let Some(template) = &blocks.template {
            let literal = serde_json::to_string(template)
                .map_err(|e| JitError::Compile(format!("template: {e}")))?;
            out.push_str(&format!("{COMPONENT_BINDING}.template = {literal}\n"));
        }

        out.push_str(&format!("return {COMPONENT_BINDING};"));
        Ok(CompiledSfc { script: out })
    }
}

/// Replace every import statement with `require` lines, one per line so the
/// resolver can strip them.
fn rewrite_imports(script: &str, counter: &mut usize) -> String {
    let mut out = String::with_capacity(script.len());
    let mut cursor = 0;
    for import in parse_script_imports(script) {
        out.push_str(&script[cursor..import.span.start]);
        out.push_str(&import_to_require(&import, counter));
        cursor = import.span.end;
    }
    out.push_str(&script[cursor..]);
    out
}

fn import_to_require(import: &ScriptImport, counter: &mut usize) -> String {
    if import.is_type_only {
        return String::new();
    }
    let quote = if import.path.contains('\'') { '"' } else { '\'' };
    let require = format!("require({quote}{}{quote})", import.path);

    if import.binds_nothing() {
        return format!("{require};");
    }
    if import.named.is_empty() {
        match (&import.default, &import.namespace) {
            (Some(name), None) | (None, Some(name)) => return format!("const {name} = {require}"),
            _ => {}
        }
    }

    let temp = format!("{IMPORT_TEMP_PREFIX}{counter}");
    *counter += 1;
    let mut lines = vec![format!("const {temp} = {require}")];
    if let Some(name) = &import.default {
        lines.push(format!("const {name} = {temp}"));
    }
    if let Some(name) = &import.namespace {
        lines.push(format!("const {name} = {temp}"));
    }
    if !import.named.is_empty() {
        let fields: Vec<String> = import
            .named
            .iter()
            .map(|(imported, local)| {
                if imported == local {
                    imported.clone()
                } else {
                    format!("{imported}: {local}")
                }
            })
            .collect();
        lines.push(format!("const {{ {} }} = {temp}", fields.join(", ")));
    }
    lines.join("\n")
}

/// `export default <expr>` → `const __component__ = <expr>`.
fn rewrite_default_export(script: &str) -> (String, bool) {
    let masked = mask_literals(script);
    let re = Regex::new(r"\bexport\s+default\s+").unwrap();
    match re.find(&masked) {
        Some(m) => (
            format!(
                "{}const {COMPONENT_BINDING} = {}",
                &script[..m.start()],
                &script[m.end()..]
            ),
            true,
        ),
        None => (script.to_string(), false),
    }
}

/// `export const x = 1` → `const x = 1`, and the same for other declarations.
fn strip_named_exports(script: &str) -> String {
    let re = Regex::new(r"(?m)^([ \t]*)export\s+((?:async\s+)?(?:const|let|var|function|class)\b)")
        .unwrap();
    re.replace_all(script, "$1$2").into_owned()
}

/// Names declared at the top level of a `<script setup>` body, in source order.
fn top_level_bindings(body: &str) -> Vec<String> {
    let masked = mask_literals(body);
    let mut found: Vec<(usize, String)> = Vec::new();

    let single_re = Regex::new(
        r"\b(?:(?:const|let|var)\s+|function\s*\*?\s*|class\s+)([A-Za-z_$][\w$]*)",
    )
    .unwrap();
    for cap in single_re.captures_iter(&masked) {
        let m = cap.get(0).unwrap();
        if depth_at(&masked, m.start()) == 0 {
            found.push((m.start(), cap[1].to_string()));
        }
    }

    let destructure_re = Regex::new(r"\b(?:const|let|var)\s*\{([^{}]*)\}\s*=").unwrap();
    for cap in destructure_re.captures_iter(&masked) {
        let m = cap.get(0).unwrap();
        if depth_at(&masked, m.start()) != 0 {
            continue;
        }
        for part in cap[1].split(',') {
            let local = part.rsplit(':').next().unwrap_or("");
            let local = local.split('=').next().unwrap_or("").trim();
            let local = local.trim_start_matches("...").trim();
            found.push((m.start(), local.to_string()));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    let mut names: Vec<String> = Vec::new();
    for (_, name) in found {
        if is_identifier(&name)
            && !name.starts_with(IMPORT_TEMP_PREFIX)
            && !names.contains(&name)
        {
            names.push(name);
        }
    }
    names
}
