use jitvue_transform::ModuleTable;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::JitError;

/// Exported symbols of a framework module, e.g. `ref`, `computed`.
pub type Namespace = BTreeMap<String, Value>;

/// Everything a generated function body can see when it runs.
///
/// Stands in for a shared global object: framework symbols and resolved
/// `require` bindings live in `globals`, and `require(id)` is served from
/// `modules`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    modules: ModuleTable<Value>,
    globals: BTreeMap<String, Value>,
}

impl ExecutionContext {
    pub fn new(modules: ModuleTable<Value>) -> Self {
        Self {
            modules,
            globals: BTreeMap::new(),
        }
    }

    /// Write every symbol of `namespace` into the globals, overwriting any
    /// previous value under the same name.
    pub fn inject_namespace(&mut self, namespace: &Namespace) {
        for (name, value) in namespace {
            self.globals.insert(name.clone(), value.clone());
        }
    }

    /// Add resolved `require` bindings to the globals.
    pub fn bind_all(&mut self, bindings: BTreeMap<String, Value>) {
        self.globals.extend(bindings);
    }

    /// CommonJS-style module lookup.
    pub fn require(&self, id: &str) -> Result<&Value, JitError> {
        self.modules
            .get(id)
            .ok_or_else(|| JitError::ModuleNotFound(id.to_string()))
    }

    /// Resolve a free identifier of the function body against the globals,
    /// then the module table.
    pub fn lookup(&self, name: &str) -> Result<&Value, JitError> {
        self.globals
            .get(name)
            .or_else(|| self.modules.get(name))
            .ok_or_else(|| JitError::ModuleNotFound(name.to_string()))
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn globals(&self) -> &BTreeMap<String, Value> {
        &self.globals
    }

    pub fn modules(&self) -> &ModuleTable<Value> {
        &self.modules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_known_and_missing() {
        let mut modules = ModuleTable::new();
        modules.insert("lodash".to_string(), json!({"chunk": "fn"}));
        let ctx = ExecutionContext::new(modules);

        assert_eq!(ctx.require("lodash").unwrap(), &json!({"chunk": "fn"}));
        let err = ctx.require("nope").unwrap_err();
        assert_eq!(err, JitError::ModuleNotFound("nope".to_string()));
        assert_eq!(err.to_string(), "[CJS] Not found module: nope");
    }

    #[test]
    fn test_inject_namespace_is_idempotent() {
        let mut ns = Namespace::new();
        ns.insert("ref".to_string(), json!("ref"));
        ns.insert("computed".to_string(), json!("computed"));

        let mut ctx = ExecutionContext::default();
        ctx.inject_namespace(&ns);
        let once = ctx.clone();
        ctx.inject_namespace(&ns);
        assert_eq!(ctx, once);
        assert_eq!(ctx.globals().len(), 2);
    }

    #[test]
    fn test_lookup_prefers_globals() {
        let mut modules = ModuleTable::new();
        modules.insert("x".to_string(), json!(1));
        let mut ctx = ExecutionContext::new(modules);
        ctx.bind_all(BTreeMap::from([
            ("x".to_string(), json!(2)),
            ("y".to_string(), json!(3)),
        ]));

        assert_eq!(ctx.lookup("x").unwrap(), &json!(2));
        assert_eq!(ctx.lookup("y").unwrap(), &json!(3));
        assert!(matches!(ctx.lookup("z"), Err(JitError::ModuleNotFound(name)) if name == "z"));
    }
}
