use jitvue_transform::ModuleTable;
use serde_json::Value;
use std::collections::HashMap;

/// Key under which [`InbrowserPlugin`] provides its extra modules.
pub const ADDITIONAL_MODULES_KEY: &str = "additionalModules";

/// Application-scoped module tables, keyed by injection key.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    provided: HashMap<String, ModuleTable<Value>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide `table` under `key`, replacing any earlier table.
    pub fn provide(&mut self, key: impl Into<String>, table: ModuleTable<Value>) {
        self.provided.insert(key.into(), table);
    }

    pub fn inject(&self, key: &str) -> Option<&ModuleTable<Value>> {
        self.provided.get(key)
    }
}

/// Makes a fixed set of modules available to every component compiled
/// against the registry it is installed into.
#[derive(Debug, Clone, Default)]
pub struct InbrowserPlugin {
    pub addition: ModuleTable<Value>,
}

impl InbrowserPlugin {
    pub fn new(addition: ModuleTable<Value>) -> Self {
        Self { addition }
    }

    pub fn install(&self, registry: &mut ModuleRegistry) {
        registry.provide(ADDITIONAL_MODULES_KEY, self.addition.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provide_and_inject() {
        let mut registry = ModuleRegistry::new();
        assert!(registry.inject("x").is_none());

        let mut table = ModuleTable::new();
        table.insert("a".to_string(), json!(1));
        registry.provide("x", table);
        assert_eq!(registry.inject("x").unwrap().get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_plugin_install() {
        let mut addition = ModuleTable::new();
        addition.insert("dayjs".to_string(), json!({"format": "fn"}));
        let plugin = InbrowserPlugin::new(addition);

        let mut registry = ModuleRegistry::new();
        plugin.install(&mut registry);
        let injected = registry.inject(ADDITIONAL_MODULES_KEY).unwrap();
        assert!(injected.contains_key("dayjs"));
    }
}
