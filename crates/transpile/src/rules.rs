//! The fixed rewrite table and output preamble.
//!
//! Both live here as process-wide constants so the rule ordering is carried by
//! one data structure instead of scattered call sites. `lib.rs` walks `RULES`
//! front to back; later rules see the output of earlier ones.

/// How a rule's pattern matches against the shader text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pattern {
    /// Matches the name only when it stands alone as a complete identifier,
    /// never inside a longer one (`iTime` must not fire within `iTimeDelta`).
    Identifier(&'static str),
    /// Matches the exact character sequence, whitespace included.
    Phrase(&'static str),
}

/// One ordered pattern/replacement pair.
#[derive(Clone, Copy, Debug)]
pub struct RewriteRule {
    pub pattern: Pattern,
    pub replacement: &'static str,
}

impl RewriteRule {
    /// Applies this rule to `input`, returning the rewritten text.
    ///
    /// Substitution is best-effort: text the pattern does not recognise passes
    /// through untouched.
    pub fn apply(&self, input: &str) -> String {
        match self.pattern {
            Pattern::Identifier(name) => replace_identifier(input, name, self.replacement),
            Pattern::Phrase(text) => input.replace(text, self.replacement),
        }
    }
}

/// The rewrite sequence, in application order.
///
/// The `mainImage` phrase must be rewritten before the `fragCoord` identifier
/// rule runs; the phrase contains `fragCoord`, so swapping the two changes
/// whether the phrase still matches. Treat the order as part of the contract.
pub const RULES: [RewriteRule; 4] = [
    RewriteRule {
        pattern: Pattern::Identifier("iResolution"),
        replacement: "uResolution",
    },
    RewriteRule {
        pattern: Pattern::Identifier("iTime"),
        replacement: "uTime",
    },
    RewriteRule {
        pattern: Pattern::Phrase("void mainImage( out vec4 fragColor, in vec2 fragCoord )"),
        replacement: "void main()",
    },
    RewriteRule {
        pattern: Pattern::Identifier("fragCoord"),
        replacement: "gl_FragCoord.xy",
    },
];

/// Declarations prepended verbatim to every rewritten shader body.
///
/// The rewritten body assigns to `fragColor` by name reuse; no rule renames
/// it, so the `out` declaration here is what makes the assignment legal.
pub const PREAMBLE: &str = r"#version 330 core
uniform float uTime;         // Equivalent to iTime
uniform vec2 uResolution;    // Equivalent to iResolution
out vec4 fragColor;          // Output variable
";

/// Replaces whole-identifier occurrences of `name` with `replacement`.
///
/// A candidate is rejected when the character on either side belongs to the
/// identifier alphabet (`[A-Za-z0-9_]`). Replacement text is never rescanned,
/// so a rule whose output contains its own pattern still terminates.
fn replace_identifier(input: &str, name: &str, replacement: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(offset) = rest.find(name) {
        let (before, tail) = rest.split_at(offset);
        output.push_str(before);

        let after = &tail[name.len()..];
        let left_bounded = before
            .chars()
            .next_back()
            .map_or(true, |ch| !is_identifier_char(ch));
        let right_bounded = after
            .chars()
            .next()
            .map_or(true, |ch| !is_identifier_char(ch));

        if left_bounded && right_bounded {
            output.push_str(replacement);
            rest = after;
        } else {
            // Not a standalone identifier. Emit one character and rescan so
            // overlapping candidates further along are still considered.
            let mut chars = tail.chars();
            if let Some(ch) = chars.next() {
                output.push(ch);
            }
            rest = chars.as_str();
        }
    }

    output.push_str(rest);
    output
}

fn is_identifier_char(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_rule_respects_boundaries() {
        let rule = &RULES[1];
        assert_eq!(rule.apply("iTime + iTimeDelta"), "uTime + iTimeDelta");
        assert_eq!(rule.apply("myiTime"), "myiTime");
        assert_eq!(rule.apply("iTime_"), "iTime_");
        assert_eq!(rule.apply("(iTime)"), "(uTime)");
    }

    #[test]
    fn identifier_rule_handles_adjacent_candidates() {
        let rule = &RULES[1];
        assert_eq!(rule.apply("iTimeiTime"), "iTimeiTime");
        assert_eq!(rule.apply("iTime iTime"), "uTime uTime");
    }

    #[test]
    fn identifier_rules_are_idempotent() {
        let body = "vec3 c = vec3(iResolution.x, iTime, fragCoord.y);";
        for rule in &RULES {
            let once = rule.apply(body);
            assert_eq!(rule.apply(&once), once);
        }
    }

    #[test]
    fn phrase_rule_is_exact_match_only() {
        let rule = &RULES[2];
        let canonical = "void mainImage( out vec4 fragColor, in vec2 fragCoord )";
        assert_eq!(rule.apply(canonical), "void main()");

        // Any spacing variation falls outside the literal phrase.
        let spaced = "void mainImage( out vec4 fragColor, in vec2 fragCoord  )";
        assert_eq!(rule.apply(spaced), spaced);
        let compact = "void mainImage(out vec4 fragColor, in vec2 fragCoord)";
        assert_eq!(rule.apply(compact), compact);
    }
}
