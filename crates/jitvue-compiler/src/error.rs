use thiserror::Error;

/// Errors surfaced by the compile and evaluate entry points.
///
/// The transformer itself never fails; these come from the component
/// compiler, from module lookups at execution time, and from evaluators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JitError {
    /// An identifier or `require` id missing from the execution context.
    #[error("[CJS] Not found module: {0}")]
    ModuleNotFound(String),

    /// The evaluator rejected the generated function body.
    #[error("Failed to evaluate component script: {0}")]
    SyntaxFailure(String),

    /// The component compiler could not produce a script.
    #[error("Failed to compile component: {0}")]
    Compile(String),
}
