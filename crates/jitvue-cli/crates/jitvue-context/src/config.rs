use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Represents the `jitvue.json` project configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JitConfig {
    #[serde(default)]
    pub framework: FrameworkConfig,
    /// Modules available to `require`, keyed by module name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modules: BTreeMap<String, Value>,
}

/// The framework module every component can import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkConfig {
    #[serde(default = "default_framework_name")]
    pub name: String,
    /// Exported symbols, e.g. `{ "ref": ..., "computed": ... }`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub symbols: BTreeMap<String, Value>,
}

fn default_framework_name() -> String {
    "vue".into()
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            name: default_framework_name(),
            symbols: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config: JitConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, JitConfig::default());
        assert_eq!(config.framework.name, "vue");
    }

    #[test]
    fn test_parse_full_config() {
        let raw = r#"{
            "framework": { "name": "vue", "symbols": { "ref": "ref" } },
            "modules": { "dayjs": { "version": "1.11" } }
        }"#;
        let config: JitConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.framework.symbols.len(), 1);
        assert!(config.modules.contains_key("dayjs"));
    }
}
