use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "toyglsl",
    author,
    version,
    about = "Convert shadertoy.com shaders into self-contained GLSL fragment shaders"
)]
pub struct Cli {
    /// ShaderToy shader file to convert.
    #[arg(value_name = "INPUT_FILE")]
    pub input_file: PathBuf,

    /// Destination for the rewritten GLSL shader.
    #[arg(value_name = "OUTPUT_FILE")]
    pub output_file: PathBuf,
}

pub fn parse() -> Cli {
    Cli::parse()
}
