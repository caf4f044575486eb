//! Converts shadertoy.com fragment shaders into self-contained desktop GLSL.
//!
//! ShaderToy shaders lean on implicit uniforms (`iResolution`, `iTime`) and a
//! `mainImage(out vec4 fragColor, in vec2 fragCoord)` entry point supplied by
//! the site. [`rewrite`] turns such a shader into a module a plain OpenGL
//! pipeline can compile: explicit uniform declarations, a `main()` entry
//! point, and an explicit output variable.
//!
//! The transform is deliberately lexical. It applies the ordered substitution
//! table in [`rules::RULES`] and prepends [`rules::PREAMBLE`]; it builds no
//! AST, checks no types, and never fails. Input it does not recognise passes
//! through unchanged, including `mainImage` signatures whose spacing deviates
//! from the canonical ShaderToy form.

mod rules;

pub use rules::{Pattern, RewriteRule, PREAMBLE, RULES};

/// Rewrites a ShaderToy-flavored fragment shader into desktop GLSL.
///
/// Pure and deterministic: the same input always yields byte-identical
/// output. Rules run in table order, each seeing the previous rule's output,
/// and the fixed preamble is prepended last. An empty input yields exactly
/// the preamble.
pub fn rewrite(source: &str) -> String {
    let mut body = source.to_string();
    for rule in &RULES {
        body = rule.apply(&body);
    }
    tracing::debug!(
        input_bytes = source.len(),
        output_bytes = PREAMBLE.len() + body.len(),
        "rewrote shadertoy shader"
    );
    format!("{PREAMBLE}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_canonical_shadertoy_shader() {
        let input = "void mainImage( out vec4 fragColor, in vec2 fragCoord ) { fragColor = vec4(iResolution.xy, iTime, 1.0); }";
        let output = rewrite(input);

        assert!(output.starts_with(PREAMBLE));
        // `fragColor` itself is never renamed; the preamble's `out`
        // declaration is what the body's assignment resolves against.
        assert_eq!(
            &output[PREAMBLE.len()..],
            "void main() { fragColor = vec4(uResolution.xy, uTime, 1.0); }"
        );
    }

    #[test]
    fn nonstandard_signature_spacing_passes_through() {
        let input = "void mainImage( out vec4 fragColor, in vec2 fragCoord  ) { fragColor = vec4(iTime); }";
        let output = rewrite(input);

        // The signature keeps `mainImage`, and the `fragCoord` parameter
        // inside it is still rewritten by the identifier rule.
        assert!(output.contains("void mainImage( out vec4 fragColor, in vec2 gl_FragCoord.xy  )"));
        assert!(output.contains("fragColor = vec4(uTime);"));
        assert!(!output.contains("void main()"));
    }

    #[test]
    fn empty_input_yields_exactly_the_preamble() {
        assert_eq!(rewrite(""), PREAMBLE);
    }

    #[test]
    fn unrecognised_input_is_preamble_plus_original() {
        let input = "float noise(vec2 p) { return fract(sin(dot(p, vec2(12.9898, 78.233)))); }";
        assert_eq!(rewrite(input), format!("{PREAMBLE}{input}"));
    }

    #[test]
    fn rewrite_is_deterministic() {
        let input = "void mainImage( out vec4 fragColor, in vec2 fragCoord ) {\n    vec2 uv = fragCoord / iResolution.xy;\n    fragColor = vec4(uv, sin(iTime), 1.0);\n}\n";
        assert_eq!(rewrite(input), rewrite(input));
    }

    #[test]
    fn signature_phrase_is_matched_before_frag_coord_rule() {
        let signature = "void mainImage( out vec4 fragColor, in vec2 fragCoord )";
        let output = rewrite(signature);
        assert_eq!(&output[PREAMBLE.len()..], "void main()");

        // Running the identifier rule first consumes the `fragCoord` inside
        // the signature, after which the literal phrase can no longer match.
        // Swapping the table order is a regression, not a refactor.
        let premature = RULES[3].apply(signature);
        assert_eq!(RULES[2].apply(&premature), premature);
        assert!(premature.contains("mainImage"));
    }

    #[test]
    fn uniform_names_rewrite_anywhere_in_the_body() {
        let input = "vec2 uv = fragCoord / iResolution.xy;\nfloat t = iTime * 0.5;\n";
        let output = rewrite(input);
        assert!(output.ends_with(
            "vec2 uv = gl_FragCoord.xy / uResolution.xy;\nfloat t = uTime * 0.5;\n"
        ));
    }
}
