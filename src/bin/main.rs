use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;

/// Compiles ZRM sources to C++.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The `.zrm` source file to compile.
    input: PathBuf,

    /// Where to write the generated C++; defaults to the input path with
    /// a `.cpp` extension.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read `{}`", cli.input.display()))?;

    // The unit is compiled fully in memory, so a failing run never leaves
    // a partial output file behind.
    let compiled = zrm::compiler::compile(&source)
        .map_err(|error| anyhow::anyhow!("{}:{error}", cli.input.display()))?;

    let path = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("cpp"));
    fs::write(&path, compiled).with_context(|| format!("failed to write `{}`", path.display()))?;
    Ok(())
}
