mod cli;

use std::fs;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() -> Result<()> {
    let cli = cli::parse();
    initialise_tracing();
    run(cli)
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let source = fs::read_to_string(&cli.input_file)
        .with_context(|| format!("failed to read shader at {}", cli.input_file.display()))?;
    tracing::debug!(
        input = %cli.input_file.display(),
        bytes = source.len(),
        "loaded shadertoy shader"
    );

    let converted = transpile::rewrite(&source);

    fs::write(&cli.output_file, &converted).with_context(|| {
        format!(
            "failed to write converted shader to {}",
            cli.output_file.display()
        )
    })?;

    println!("Converted shader written to {}", cli.output_file.display());
    Ok(())
}
