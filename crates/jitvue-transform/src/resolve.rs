use jitvue_parser::scan::mask_literals;
use regex::Regex;
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::debug;

/// Module name → runtime value, supplied by the caller.
pub type ModuleTable<V> = BTreeMap<String, V>;

/// A `<binding> = require('<module>')` site in compiled script text.
#[derive(Debug, Clone, PartialEq)]
pub struct RequireSite {
    pub binding: String,
    pub quote: char,
    pub module: String,
    pub span: Range<usize>,
}

/// Output of [`resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<V> {
    /// The script with standalone `require` lines removed.
    pub script: String,
    /// Identifier → module value for every require site whose module is known.
    pub bindings: BTreeMap<String, V>,
    pub sites: Vec<RequireSite>,
}

/// Find `[var|const|let] name = require('module')` sites.
///
/// The quote character must be the same on both sides of the module name.
/// Sites inside strings and comments are ignored.
pub fn find_require_sites(script: &str) -> Vec<RequireSite> {
    let masked = mask_literals(script);
    let re = Regex::new(
        r#"(?:\b(?:var|const|let)\s+)?([A-Za-z_$][\w$]*)\s*=\s*require\(\s*(?:'([^'\n]*)'|"([^"\n]*)")\s*\)"#,
    )
    .unwrap();
    re.captures_iter(&masked)
        .map(|cap| {
            let (quote, module) = match (cap.get(2), cap.get(3)) {
                (Some(single), _) => ('\'', &script[single.range()]),
                (None, Some(double)) => ('"', &script[double.range()]),
                (None, None) => ('\'', ""),
            };
            RequireSite {
                binding: cap[1].to_string(),
                quote,
                module: module.to_string(),
                span: cap.get(0).unwrap().range(),
            }
        })
        .collect()
}

/// Resolve require sites against `table` and strip standalone require lines.
///
/// Resolution walks the table's keys and looks for sites naming each one, so a
/// site whose module is missing from the table simply produces no binding.
/// Its identifier is left dangling in the script and fails when executed.
pub fn resolve<V: Clone>(script: &str, table: &ModuleTable<V>) -> Resolution<V> {
    let sites = find_require_sites(script);
    let mut bindings = BTreeMap::new();

    for (module, value) in table {
        for site in sites.iter().filter(|site| &site.module == module) {
            bindings.insert(site.binding.clone(), value.clone());
        }
    }

    for site in sites.iter().filter(|site| !table.contains_key(&site.module)) {
        debug!(binding = %site.binding, module = %site.module, "require left unresolved");
    }

    Resolution {
        script: strip_require_lines(script),
        bindings,
        sites,
    }
}

/// Remove every line that ends in `require('...')` (optionally followed by `;`).
///
/// A require nested inside a larger expression on its line is kept, and so is
/// a line whose only `require` sits in a string or comment.
pub fn strip_require_lines(script: &str) -> String {
    if !script.contains("require(") {
        return script.to_string();
    }
    let masked = mask_literals(script);
    let re = Regex::new(
        r#"(?m)^[^\n]*\brequire\([ \t]*(?:'[^'\n]*'|"[^"\n]*")[ \t]*\)[ \t]*;?[ \t]*\r?(?:\n|\z)"#,
    )
    .unwrap();

    let mut out = String::with_capacity(script.len());
    let mut cursor = 0;
    let mut stripped = 0;
    for m in re.find_iter(&masked) {
        out.push_str(&script[cursor..m.start()]);
        cursor = m.end();
        stripped += 1;
    }
    out.push_str(&script[cursor..]);

    if stripped > 0 {
        debug!(lines = stripped, "stripped require lines");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, i32)]) -> ModuleTable<i32> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_find_require_sites_quotes() {
        let script = "const a = require('one')\nlet b = require(\"two\");\nc = require('three')";
        let sites = find_require_sites(script);
        assert_eq!(sites.len(), 3);
        assert_eq!(sites[0].binding, "a");
        assert_eq!(sites[0].quote, '\'');
        assert_eq!(sites[0].module, "one");
        assert_eq!(sites[1].quote, '"');
        assert_eq!(sites[1].module, "two");
        assert_eq!(sites[2].binding, "c");
        assert_eq!(&script[sites[0].span.clone()], "const a = require('one')");
    }

    #[test]
    fn test_find_require_sites_mixed_quotes_rejected() {
        let sites = find_require_sites("const a = require('one\")");
        assert!(sites.is_empty());
    }

    #[test]
    fn test_resolve_no_requires_is_noop() {
        let script = "const a = 1\nreturn { a }";
        let resolution = resolve(script, &table(&[("bar", 1)]));
        assert_eq!(resolution.script, script);
        assert!(resolution.bindings.is_empty());
        assert!(resolution.sites.is_empty());
    }

    #[test]
    fn test_resolve_known_module() {
        let script = "const foo = require('bar')\nreturn { foo }";
        let resolution = resolve(script, &table(&[("bar", 7)]));
        assert_eq!(resolution.script, "return { foo }");
        assert_eq!(resolution.bindings.get("foo"), Some(&7));
        assert_eq!(resolution.bindings.len(), 1);
    }

    #[test]
    fn test_resolve_missing_module_still_stripped() {
        let script = "const foo = require('missing');\nreturn { foo }";
        let resolution = resolve(script, &table(&[("bar", 7)]));
        assert_eq!(resolution.script, "return { foo }");
        assert!(resolution.bindings.is_empty());
        assert_eq!(resolution.sites.len(), 1);
    }

    #[test]
    fn test_resolve_empty_table() {
        let script = "var vue = require(\"vue\")\nfoo()";
        let resolution = resolve::<i32>(script, &ModuleTable::new());
        assert_eq!(resolution.script, "foo()");
        assert!(resolution.bindings.is_empty());
    }

    #[test]
    fn test_resolve_same_module_twice() {
        let script = "const a = require('m')\nconst b = require('m')\nuse(a, b)";
        let resolution = resolve(script, &table(&[("m", 3)]));
        assert_eq!(resolution.bindings.get("a"), Some(&3));
        assert_eq!(resolution.bindings.get("b"), Some(&3));
        assert_eq!(resolution.script, "use(a, b)");
    }

    #[test]
    fn test_strip_keeps_inline_require() {
        let script = "register(require('x'));\nconst y = require('y').default\nconst z = require('z')";
        let stripped = strip_require_lines(script);
        assert_eq!(
            stripped,
            "register(require('x'));\nconst y = require('y').default\n"
        );
    }

    #[test]
    fn test_strip_ignores_require_in_comment_or_string() {
        let script = "run() // require('x')\nconst s = \"require('y')\"\nconst z = require('z')\ndone()";
        assert_eq!(
            strip_require_lines(script),
            "run() // require('x')\nconst s = \"require('y')\"\ndone()"
        );
    }

    #[test]
    fn test_find_require_sites_skips_comments() {
        let script = "// const a = require('old')\nconst b = require('new')";
        let sites = find_require_sites(script);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].binding, "b");
        assert_eq!(sites[0].module, "new");
    }

    #[test]
    fn test_strip_bare_require_line() {
        let script = "  require('./side-effect');\nrun()";
        assert_eq!(strip_require_lines(script), "run()");
    }
}
