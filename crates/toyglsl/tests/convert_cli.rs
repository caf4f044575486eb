use std::fs;
use std::process::Command;

use tempfile::TempDir;

const SHADER: &str = "void mainImage( out vec4 fragColor, in vec2 fragCoord )\n{\n    vec2 uv = fragCoord / iResolution.xy;\n    fragColor = vec4(uv, sin(iTime), 1.0);\n}\n";

#[test]
fn converts_shader_file_and_reports_output_path() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("plasma.frag");
    let output = dir.path().join("plasma.glsl");
    fs::write(&input, SHADER).unwrap();

    let result = Command::new(env!("CARGO_BIN_EXE_toyglsl"))
        .arg(&input)
        .arg(&output)
        .output()
        .expect("failed to run toyglsl");

    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Converted shader written to"));
    assert!(stdout.contains("plasma.glsl"));

    let converted = fs::read_to_string(&output).unwrap();
    assert!(converted.starts_with("#version 330 core\n"));
    assert!(converted.contains("uniform float uTime;"));
    assert!(converted.contains("uniform vec2 uResolution;"));
    assert!(converted.contains("void main()"));
    assert!(converted.contains("gl_FragCoord.xy / uResolution.xy"));
    assert!(!converted.contains("mainImage"));
}

#[test]
fn missing_input_file_fails_without_writing_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("absent.frag");
    let output = dir.path().join("absent.glsl");

    let status = Command::new(env!("CARGO_BIN_EXE_toyglsl"))
        .arg(&input)
        .arg(&output)
        .status()
        .expect("failed to run toyglsl");

    assert!(!status.success());
    assert!(!output.exists());
}

#[test]
fn conversion_is_byte_identical_across_runs() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("shader.frag");
    fs::write(&input, SHADER).unwrap();

    let first = dir.path().join("first.glsl");
    let second = dir.path().join("second.glsl");
    for output in [&first, &second] {
        let status = Command::new(env!("CARGO_BIN_EXE_toyglsl"))
            .arg(&input)
            .arg(output)
            .status()
            .expect("failed to run toyglsl");
        assert!(status.success());
    }

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}
