use anyhow::Result;
use jitvue_compiler::CompiledScript;
use serde_json::{json, Value};

use super::SourceArgs;

pub fn run(args: &SourceArgs) -> Result<()> {
    let compiled = super::compile(args)?;
    println!("{}", serde_json::to_string_pretty(&report(&compiled))?);
    Ok(())
}

fn report(compiled: &CompiledScript) -> Value {
    let requires: Vec<Value> = compiled
        .requires
        .iter()
        .map(|site| {
            json!({
                "binding": site.binding,
                "module": site.module,
                "resolved": compiled.bindings.contains_key(&site.binding),
            })
        })
        .collect();

    json!({
        "localNames": compiled.local_names,
        "requires": requires,
        "bindings": compiled.bindings,
        "modules": compiled.context.modules().keys().collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jitvue_compiler::{JitCompiler, ModuleTable, Namespace, Precompiled};

    #[test]
    fn test_report_marks_unresolved_requires() {
        let jit = JitCompiler::with_compiler(
            Precompiled("const a = require('a')\nconst b = require('b')\nreturn { a, b, tmp }".to_string()),
            "vue",
            Namespace::new(),
        );
        let mut modules = ModuleTable::new();
        modules.insert("a".to_string(), json!(1));
        let compiled = jit
            .compile_script("const f = () => { tmp = 1 }", &modules, None)
            .unwrap();

        let report = report(&compiled);
        assert_eq!(report["localNames"], json!(["tmp"]));
        assert_eq!(report["requires"][0]["resolved"], json!(true));
        assert_eq!(report["requires"][1]["module"], json!("b"));
        assert_eq!(report["requires"][1]["resolved"], json!(false));
        assert_eq!(report["bindings"], json!({ "a": 1 }));
        assert_eq!(report["modules"], json!(["a", "vue"]));
    }
}
