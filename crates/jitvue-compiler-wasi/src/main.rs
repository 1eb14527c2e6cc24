use std::collections::BTreeMap;
use std::io::{self, BufRead, Read, Write};

use jitvue_compiler::{
    ComponentCompiler, JitCompiler, ModuleTable, Namespace, Precompiled, SfcCompiler,
    DEFAULT_FRAMEWORK,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransformRequest {
    source: String,
    /// Output of an external component compiler. The built-in compiler is
    /// used when absent.
    #[serde(default)]
    compiled_script: Option<String>,
    #[serde(default)]
    modules: ModuleTable<Value>,
    /// Exported symbols of the framework module.
    #[serde(default)]
    framework: Namespace,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct TransformResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bindings: Option<BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    local_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TransformResponse {
    fn failed(error: String) -> Self {
        Self {
            ok: false,
            error: Some(error),
            ..Default::default()
        }
    }
}

fn transform(req: TransformRequest) -> TransformResponse {
    let compiler: Box<dyn ComponentCompiler> = match req.compiled_script {
        Some(script) => Box::new(Precompiled(script)),
        None => Box::new(SfcCompiler),
    };
    let jit = JitCompiler::with_compiler(compiler, DEFAULT_FRAMEWORK, req.framework);

    match jit.compile_script(&req.source, &req.modules, None) {
        Ok(compiled) => TransformResponse {
            ok: true,
            script: Some(compiled.script),
            bindings: Some(compiled.bindings),
            local_names: Some(compiled.local_names.into_iter().collect()),
            error: None,
        },
        Err(e) => TransformResponse::failed(e.to_string()),
    }
}

fn handle(input: &str) -> TransformResponse {
    match serde_json::from_str::<TransformRequest>(input) {
        Ok(req) => transform(req),
        Err(e) => TransformResponse::failed(e.to_string()),
    }
}

fn write_response(resp: &TransformResponse) -> io::Result<()> {
    let out = serde_json::to_string(resp)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(out.as_bytes())?;
    handle.write_all(b"\n")?;
    handle.flush()
}

fn main() -> io::Result<()> {
    let daemon = std::env::args().any(|a| a == "--daemon");

    if daemon {
        // Daemon mode: one JSON object per line (JSON Lines) until stdin hits EOF.
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            write_response(&handle(line))?;
        }
        Ok(())
    } else {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        write_response(&handle(&input))
    }
}
