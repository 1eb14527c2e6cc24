pub mod context;
pub mod error;
pub mod registry;
pub mod sfc;

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub use context::{ExecutionContext, Namespace};
pub use error::JitError;
pub use jitvue_transform::{transform, ModuleTable, RequireSite, Transformed};
pub use registry::{InbrowserPlugin, ModuleRegistry, ADDITIONAL_MODULES_KEY};
pub use sfc::{ComponentCompiler, CompiledSfc, Precompiled, SfcCompiler};

/// Module name under which the framework namespace is always available.
pub const DEFAULT_FRAMEWORK: &str = "vue";

/// Runs a generated function body and produces a component.
///
/// Implementations own the actual JavaScript engine. Lookups of free
/// identifiers should go through [`ExecutionContext::lookup`] or
/// [`ExecutionContext::require`] so a missing module surfaces as
/// [`JitError::ModuleNotFound`]; anything the engine rejects is reported as
/// [`JitError::SyntaxFailure`].
pub trait Evaluator {
    type Component;

    fn evaluate(&self, body: &str, context: &ExecutionContext) -> Result<Self::Component, JitError>;
}

/// A transformed component script together with what it needs to run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledScript {
    pub script: String,
    pub context: ExecutionContext,
    /// Identifier → module value for the require sites that were resolved.
    pub bindings: BTreeMap<String, Value>,
    pub requires: Vec<RequireSite>,
    pub local_names: BTreeSet<String>,
}

/// Compiles component source into a bare function body plus its execution
/// context.
pub struct JitCompiler<C = SfcCompiler> {
    compiler: C,
    framework_name: String,
    framework: Namespace,
}

impl JitCompiler<SfcCompiler> {
    /// Use the built-in [`SfcCompiler`] with `framework` exposed as `vue`.
    pub fn new(framework: Namespace) -> Self {
        Self::with_compiler(SfcCompiler, DEFAULT_FRAMEWORK, framework)
    }
}

impl<C: ComponentCompiler> JitCompiler<C> {
    pub fn with_compiler(compiler: C, framework_name: impl Into<String>, framework: Namespace) -> Self {
        Self {
            compiler,
            framework_name: framework_name.into(),
            framework,
        }
    }

    /// Merge the module sources for one call. Later sources win:
    /// the framework module, then modules injected from `registry` under
    /// [`ADDITIONAL_MODULES_KEY`], then `imported`.
    pub fn module_table(
        &self,
        imported: &ModuleTable<Value>,
        registry: Option<&ModuleRegistry>,
    ) -> ModuleTable<Value> {
        let mut table = ModuleTable::new();
        table.insert(
            self.framework_name.clone(),
            Value::Object(self.framework.clone().into_iter().collect()),
        );
        if let Some(additional) = registry.and_then(|r| r.inject(ADDITIONAL_MODULES_KEY)) {
            table.extend(additional.clone());
        }
        table.extend(imported.clone());
        table
    }

    /// Compile `source`, resolve its requires and filter its return objects.
    pub fn compile_script(
        &self,
        source: &str,
        imported: &ModuleTable<Value>,
        registry: Option<&ModuleRegistry>,
    ) -> Result<CompiledScript, JitError> {
        let compiled = self.compiler.compile(source)?;
        let modules = self.module_table(imported, registry);
        let transformed = transform(source, &compiled.script, &modules);

        let mut context = ExecutionContext::new(modules);
        context.inject_namespace(&self.framework);
        context.bind_all(transformed.bindings.clone());

        debug!(
            bindings = transformed.bindings.len(),
            local_names = transformed.local_names.len(),
            "compiled component script"
        );

        Ok(CompiledScript {
            script: transformed.script,
            context,
            bindings: transformed.bindings,
            requires: transformed.requires,
            local_names: transformed.local_names,
        })
    }

    /// Compile `source` and hand the result to `evaluator`. Evaluation errors
    /// are returned unchanged.
    pub fn compile_component<E: Evaluator>(
        &self,
        source: &str,
        imported: &ModuleTable<Value>,
        registry: Option<&ModuleRegistry>,
        evaluator: &E,
    ) -> Result<E::Component, JitError> {
        let compiled = self.compile_script(source, imported, registry)?;
        evaluator.evaluate(&compiled.script, &compiled.context)
    }
}

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

/// Transform a component for the browser. `compiled_script` may be empty to
/// use the built-in compiler; `modules_json` is a JSON object of modules.
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub fn transform_sfc(
    source: &str,
    compiled_script: &str,
    modules_json: &str,
) -> Result<String, JsValue> {
    let modules: ModuleTable<Value> = serde_json::from_str(modules_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid modules JSON: {e}")))?;

    let compiler: Box<dyn ComponentCompiler> = if compiled_script.is_empty() {
        Box::new(SfcCompiler)
    } else {
        Box::new(Precompiled(compiled_script.to_string()))
    };
    let jit = JitCompiler::with_compiler(compiler, DEFAULT_FRAMEWORK, Namespace::new());
    jit.compile_script(source, &modules, None)
        .map(|compiled| compiled.script)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
