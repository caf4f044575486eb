use std::borrow::Cow;

use anyhow::Result;
use wgpu::naga::ShaderStage;

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    }))
}

/// Adapts a converted fragment shader to the wgpu pipeline and compiles it.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    source: &str,
) -> Result<wgpu::ShaderModule> {
    let wrapped = wrap_fragment_source(source);

    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("viewer fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(wrapped),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    }))
}

/// Bridges the `#version 330 core` convention to Vulkan-flavored GLSL.
///
/// Converted shaders declare loose `uTime`/`uResolution` uniforms and a
/// `fragColor` output, which naga cannot bind directly. Steps performed:
///
/// 1. Strip the `#version` directive plus the `uTime`, `uResolution`, and
///    `fragColor` declarations so our own definitions take their place.
/// 2. Prepend [`HEADER`], which declares the std140 uniform block, aliases the
///    uniform names onto it, and redirects `gl_FragCoord` through a global so
///    the wrapper can restore the bottom-left origin OpenGL convention.
/// 3. Append [`FOOTER`], which captures the hardware `gl_FragCoord`, flips the
///    y axis, and delegates to the shader's own `main` (renamed by macro).
fn wrap_fragment_source(source: &str) -> String {
    let mut body = String::new();
    let mut skipped_version = false;
    for line in source.lines() {
        let trimmed = line.trim_start();
        if !skipped_version && trimmed.starts_with("#version") {
            skipped_version = true;
            continue;
        }
        let is_uniform_decl = trimmed.starts_with("uniform ")
            && (trimmed.contains("uTime") || trimmed.contains("uResolution"));
        let is_output_decl = trimmed.starts_with("out ") && trimmed.contains("fragColor");
        if is_uniform_decl || is_output_decl {
            continue;
        }
        body.push_str(line);
        body.push('\n');
    }

    format!("{HEADER}\n#line 1\n{body}{FOOTER}")
}

/// GLSL prologue injected ahead of every converted fragment shader.
///
/// The uniform block layout must match `ViewerUniforms` in `gpu.rs`.
const HEADER: &str = r"#version 450
layout(location = 0) out vec4 fragColor;

layout(std140, set = 0, binding = 0) uniform ViewerParams {
    vec2 _uResolution;
    float _uTime;
    float _padding;
} ubo;

#define uResolution ubo._uResolution
#define uTime ubo._uTime

vec4 viewer_frag_coord;
#define gl_FragCoord viewer_frag_coord
#define main viewer_body_main
";

/// GLSL epilogue that remaps coordinates and calls the shader's entry point.
const FOOTER: &str = r"#undef main
void main() {
    // Read the real builtin, then remap to a bottom-left origin. The macro is
    // lifted temporarily so the hardware value is reachable.
    #undef gl_FragCoord
    vec2 builtin_coord = gl_FragCoord.xy;
    #define gl_FragCoord viewer_frag_coord

    viewer_frag_coord = vec4(builtin_coord.x, ubo._uResolution.y - builtin_coord.y, 0.0, 1.0);
    viewer_body_main();
}
";

/// Minimal full-screen triangle vertex shader.
const VERTEX_SHADER_GLSL: &str = r"#version 450
const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    gl_Position = vec4(positions[uint(gl_VertexIndex)], 0.0, 1.0);
}
";
