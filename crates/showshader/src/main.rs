mod cli;

use std::fs;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use viewer::{Viewer, ViewerConfig};

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
    let source = fs::read_to_string(&cli.shaderfile)
        .with_context(|| format!("failed to read shader at {}", cli.shaderfile.display()))?;
    tracing::info!(path = %cli.shaderfile.display(), "loaded fragment shader");

    let defaults = ViewerConfig::default();
    let config = ViewerConfig {
        source,
        surface_size: cli.size.unwrap_or(defaults.surface_size),
        title: format!(
            "showshader - {}",
            cli.shaderfile
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| cli.shaderfile.display().to_string())
        ),
    };

    Viewer::new(config).run()
}
