pub mod inspect;
pub mod transform;

use anyhow::{Context, Result};
use clap::Args;
use jitvue_compiler::{CompiledScript, ComponentCompiler, JitCompiler, Precompiled, SfcCompiler};
use jitvue_context::project::JitProject;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Args)]
pub struct SourceArgs {
    /// Component source file (.vue)
    pub file: PathBuf,
    /// Script already produced by an external component compiler
    #[arg(long)]
    pub compiled: Option<PathBuf>,
    /// Path to jitvue.json (defaults to the one in the current directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Load the project, compile `args.file` and run the transformer over it.
pub fn compile(args: &SourceArgs) -> Result<CompiledScript> {
    let project = match &args.config {
        Some(path) => JitProject::load_config_file(path)?,
        None => JitProject::load_cwd()?,
    };
    debug!(root = %project.root.display(), "loaded project");

    let source = read(&args.file)?;
    let compiler: Box<dyn ComponentCompiler> = match &args.compiled {
        Some(path) => Box::new(Precompiled(read(path)?)),
        None => Box::new(SfcCompiler),
    };

    let framework = project.config.framework;
    let jit = JitCompiler::with_compiler(compiler, framework.name, framework.symbols);
    jit.compile_script(&source, &project.config.modules, None)
        .with_context(|| format!("Failed to transform {}", args.file.display()))
}

fn read(path: &PathBuf) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
