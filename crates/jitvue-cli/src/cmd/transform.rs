use anyhow::Result;

use super::SourceArgs;

pub fn run(args: &SourceArgs) -> Result<()> {
    let compiled = super::compile(args)?;
    println!("{}", compiled.script);
    Ok(())
}
