pub mod scan;

use regex::Regex;
use std::ops::Range;

/// An ES `import` statement found in a component script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptImport {
    /// Byte range of the whole statement within the script.
    pub span: Range<usize>,
    /// Default binding: `import Foo from '...'`
    pub default: Option<String>,
    /// Namespace binding: `import * as utils from '...'`
    pub namespace: Option<String>,
    /// Named bindings as `(imported, local)` pairs.
    pub named: Vec<(String, String)>,
    /// The module specifier, e.g. `vue` or `./utils.js`
    pub path: String,
    /// Whether this is a type-only import (`import type { ... }`)
    pub is_type_only: bool,
}

impl ScriptImport {
    /// Side-effect imports (`import './polyfill'`) bind nothing.
    pub fn binds_nothing(&self) -> bool {
        self.default.is_none() && self.namespace.is_none() && self.named.is_empty()
    }
}

/// Parse every `import ... from '...'` (and bare `import '...'`) statement that
/// starts a line of `script`.
pub fn parse_script_imports(script: &str) -> Vec<ScriptImport> {
    let re = Regex::new(
        r#"(?m)^[ \t]*import\s+(?:(type)\s+)?(?:([^'"]*?)\s+from\s+)?['"]([^'"\n]+)['"][ \t]*;?"#,
    )
    .unwrap();
    re.captures_iter(script)
        .map(|cap| {
            let whole = cap.get(0).unwrap();
            let clause = cap.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            let (default, namespace, named) = parse_import_clause(clause);
            ScriptImport {
                span: whole.range(),
                default,
                namespace,
                named,
                path: cap[3].to_string(),
                is_type_only: cap.get(1).is_some(),
            }
        })
        .collect()
}

type ImportClause = (Option<String>, Option<String>, Vec<(String, String)>);

/// Split an import clause like `Foo, { a, b as c }` or `* as ns`.
fn parse_import_clause(clause: &str) -> ImportClause {
    let mut default = None;
    let mut namespace = None;
    let mut named = Vec::new();

    let (head, braces) = match (clause.find('{'), clause.rfind('}')) {
        (Some(open), Some(close)) if open < close => {
            (&clause[..open], Some(&clause[open + 1..close]))
        }
        _ => (clause, None),
    };

    for part in head.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some(ns) = part.strip_prefix('*') {
            let ns = ns.trim().trim_start_matches("as").trim();
            if scan::is_identifier(ns) {
                namespace = Some(ns.to_string());
            }
        } else if scan::is_identifier(part) {
            default = Some(part.to_string());
        }
    }

    if let Some(inner) = braces {
        for specifier in inner.split(',') {
            let specifier = specifier.trim();
            let specifier = specifier.strip_prefix("type ").map(str::trim).unwrap_or(specifier);
            if specifier.is_empty() {
                continue;
            }
            let (imported, local) = match specifier.split_once(" as ") {
                Some((imported, local)) => (imported.trim(), local.trim()),
                None => (specifier, specifier),
            };
            if scan::is_identifier(imported) && scan::is_identifier(local) {
                named.push((imported.to_string(), local.to_string()));
            }
        }
    }

    (default, namespace, named)
}

/// The extracted blocks of a single-file component.
#[derive(Debug, Default)]
pub struct SfcBlocks {
    pub template: Option<String>,
    /// A plain `<script>` block (options API, `export default { ... }`).
    pub script: Option<String>,
    /// A `<script setup>` block.
    pub script_setup: Option<String>,
    /// The `lang` attribute of the first script block, e.g. `ts`.
    pub script_lang: Option<String>,
}

/// Extract blocks from a component source using simple tag matching.
///
/// Finds `<template>` by its first opening and last closing tag so nested
/// `<template #slot>` blocks stay inside, then classifies every `<script>`
/// block by its `setup` attribute.
pub fn parse_blocks(source: &str) -> SfcBlocks {
    let mut blocks = SfcBlocks {
        template: extract_block(source, "template"),
        ..Default::default()
    };

    for script in extract_script_blocks(source) {
        if blocks.script_lang.is_none() {
            blocks.script_lang = script.lang.clone();
        }
        let slot = if script.setup {
            &mut blocks.script_setup
        } else {
            &mut blocks.script
        };
        if slot.is_none() {
            *slot = Some(script.content);
        }
    }

    blocks
}

struct ScriptBlock {
    content: String,
    setup: bool,
    lang: Option<String>,
}

fn extract_script_blocks(source: &str) -> Vec<ScriptBlock> {
    let lang_re = Regex::new(r#"lang\s*=\s*['"]([^'"]+)['"]"#).unwrap();
    let setup_re = Regex::new(r#"(?:^|\s)setup(?:\s|=|$)"#).unwrap();
    let mut blocks = Vec::new();
    let mut search_pos = 0;

    while let Some(tag_start) = source[search_pos..].find("<script") {
        let tag_start = search_pos + tag_start;
        let Some(tag_close) = source[tag_start..].find('>') else {
            break;
        };
        let attrs = &source[tag_start + "<script".len()..tag_start + tag_close];
        let content_start = tag_start + tag_close + 1;
        let Some(end_offset) = source[content_start..].find("</script>") else {
            break;
        };
        let content_end = content_start + end_offset;

        blocks.push(ScriptBlock {
            content: source[content_start..content_end].trim().to_string(),
            setup: setup_re.is_match(attrs),
            lang: lang_re.captures(attrs).map(|cap| cap[1].to_string()),
        });

        search_pos = content_end + "</script>".len();
    }

    blocks
}

fn extract_block(source: &str, tag: &str) -> Option<String> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);

    let start_idx = source.find(&open)?;
    let after_open = &source[start_idx..];
    let tag_end = after_open.find('>')?;
    let content_start = start_idx + tag_end + 1;

    // Use rfind for the closing tag to handle nested <template #slot> blocks
    let end_idx = source.rfind(&close)?;
    if end_idx <= content_start {
        return None;
    }

    Some(source[content_start..end_idx].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blocks_basic() {
        let source = r#"
<template>
  <div>Hello {{ name }}</div>
</template>

<script>
export default { data() { return { name: 'x' } } }
</script>
"#;
        let blocks = parse_blocks(source);
        assert!(blocks.template.unwrap().contains("Hello {{ name }}"));
        assert!(blocks.script.unwrap().starts_with("export default"));
        assert!(blocks.script_setup.is_none());
        assert!(blocks.script_lang.is_none());
    }

    #[test]
    fn test_parse_blocks_setup_and_plain() {
        let source = r#"
<script lang="ts">
export default { name: 'Counter' }
</script>

<script setup lang="ts">
const count = ref(0)
</script>

<template><p>{{ count }}</p></template>
"#;
        let blocks = parse_blocks(source);
        assert_eq!(blocks.script.as_deref(), Some("export default { name: 'Counter' }"));
        assert_eq!(blocks.script_setup.as_deref(), Some("const count = ref(0)"));
        assert_eq!(blocks.script_lang.as_deref(), Some("ts"));
    }

    #[test]
    fn test_parse_blocks_empty() {
        let blocks = parse_blocks("");
        assert!(blocks.template.is_none());
        assert!(blocks.script.is_none());
        assert!(blocks.script_setup.is_none());
    }

    #[test]
    fn test_parse_blocks_nested_template_slots() {
        let source = r#"
<template>
  <layout>
    <template #title>{{ title }}</template>
    <h1>Welcome</h1>
  </layout>
</template>
"#;
        let template = parse_blocks(source).template.unwrap();
        assert!(template.contains("<template #title>"));
        assert!(template.ends_with("</layout>"));
    }

    #[test]
    fn test_parse_script_imports_forms() {
        let script = r#"
import Vue from 'vue'
import { ref, computed as c } from "vue"
import * as utils from './utils.js'
import Chart, { draw } from 'chart'
import type { User } from './types'
import './polyfill'
const x = 1
"#;
        let imports = parse_script_imports(script);
        assert_eq!(imports.len(), 6);

        assert_eq!(imports[0].default.as_deref(), Some("Vue"));
        assert_eq!(imports[0].path, "vue");

        assert_eq!(
            imports[1].named,
            vec![
                ("ref".to_string(), "ref".to_string()),
                ("computed".to_string(), "c".to_string())
            ]
        );

        assert_eq!(imports[2].namespace.as_deref(), Some("utils"));
        assert_eq!(imports[2].path, "./utils.js");

        assert_eq!(imports[3].default.as_deref(), Some("Chart"));
        assert_eq!(imports[3].named, vec![("draw".to_string(), "draw".to_string())]);

        assert!(imports[4].is_type_only);
        assert!(imports[5].binds_nothing());
        assert_eq!(imports[5].path, "./polyfill");
    }

    #[test]
    fn test_parse_script_imports_span() {
        let script = "const a = 1\nimport Foo from 'foo';\nconst b = 2";
        let imports = parse_script_imports(script);
        assert_eq!(imports.len(), 1);
        assert_eq!(&script[imports[0].span.clone()], "import Foo from 'foo';");
    }

    #[test]
    fn test_parse_script_imports_multiline_named() {
        let script = "import {\n  ref,\n  watch\n} from 'vue'";
        let imports = parse_script_imports(script);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].named.len(), 2);
        assert_eq!(imports[0].named[1].1, "watch");
    }
}
