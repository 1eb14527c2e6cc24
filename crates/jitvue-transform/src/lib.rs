//! Source transformer that turns a compiled component script into a bare
//! function body.
//!
//! Two passes run over plain text, without a syntax tree:
//!
//! 1. [`resolve`] matches `name = require('module')` sites against a module
//!    table and strips standalone require lines.
//! 2. [`collect_local_names`] gathers identifiers local to nested function
//!    bodies of the *original* source, then [`filter_returns`] drops those
//!    names from every `return { ... }` object literal of the compiled script.
//!
//! Both passes are best effort. A name declared in any nested body suppresses
//! a same-named return entry anywhere, and unresolved requires are left for
//! the execution step to report.

pub mod filter;
pub mod resolve;
pub mod scope;

use std::collections::{BTreeMap, BTreeSet};

pub use filter::filter_returns;
pub use resolve::{find_require_sites, resolve, strip_require_lines, ModuleTable, RequireSite, Resolution};
pub use scope::{collect_local_names, find_function_bodies, FunctionBody, FunctionKind};

/// The result of [`transform`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed<V> {
    /// The final script, ready to run as a function body.
    pub script: String,
    /// Identifier → module value for every resolved require site.
    pub bindings: BTreeMap<String, V>,
    /// Every require site found in the compiled script, resolved or not.
    pub requires: Vec<RequireSite>,
    /// Names collected from nested bodies of the original source.
    pub local_names: BTreeSet<String>,
}

/// Resolve requires in `compiled_script`, then filter its return objects with
/// the nested-scope names of `original_source`.
///
/// The name set is complete before any return object is rewritten.
pub fn transform<V: Clone>(
    original_source: &str,
    compiled_script: &str,
    table: &ModuleTable<V>,
) -> Transformed<V> {
    let resolution = resolve(compiled_script, table);
    let local_names = collect_local_names(original_source);
    let script = filter_returns(&resolution.script, &local_names);

    Transformed {
        script,
        bindings: resolution.bindings,
        requires: resolution.sites,
        local_names,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_options_api_setup() {
        let original = r#"
<script>
import { ref } from 'vue'
export default {
  setup() {
    const count = ref(0)
    function bump() { let step = 2; count.value += step }
    return { count, bump, step }
  }
}
</script>
"#;
        let compiled = "const vue_1 = require('vue')\nconst __component__ = {\n  setup() {\n    const count = vue_1.ref(0)\n    function bump() { let step = 2; count.value += step }\n    return { count, bump, step }\n  }\n}\nreturn __component__;";

        let mut table = ModuleTable::new();
        table.insert("vue".to_string(), "vue-namespace");

        let result = transform(original, compiled, &table);
        assert_eq!(result.bindings.get("vue_1"), Some(&"vue-namespace"));
        assert!(!result.script.contains("require("));
        assert!(result.script.contains("return { bump }"));
        assert!(result.local_names.contains("count"));
        assert!(result.local_names.contains("step"));
    }

    #[test]
    fn test_transform_without_function_bodies_is_identity() {
        let original = "const a = 1\nconst b = 2";
        let compiled = "const a = 1\nconst b = 2\nreturn { a, b }";
        let result = transform::<()>(original, compiled, &ModuleTable::new());
        assert_eq!(result.script, compiled);
        assert!(result.local_names.is_empty());
        assert!(result.bindings.is_empty());
    }

    #[test]
    fn test_transform_unresolved_require_defers() {
        let original = "function f() { let x = 1 }";
        let compiled = "const lib = require('lib');\nreturn { lib, x }";
        let result = transform::<i32>(original, compiled, &ModuleTable::new());
        assert_eq!(result.script, "return { lib }");
        assert!(result.bindings.is_empty());
        assert_eq!(result.requires.len(), 1);
        assert_eq!(result.requires[0].module, "lib");
    }
}
