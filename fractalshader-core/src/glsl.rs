//! Helpers for emitting GLSL source text.

/// Format a number as a GLSL float literal.
///
/// Rust's `Display` for `f64` never uses exponent notation, but it drops
/// the fractional part of integral values (`4.0` prints as `4`), which GLSL
/// would parse as an `int`. A `.0` suffix is appended in that case.
pub fn float_literal(value: f64) -> String {
    let mut text = value.to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// Format an RGB triple as a `vec3` literal.
pub fn vec3_literal(rgb: [f64; 3]) -> String {
    format!(
        "vec3({}, {}, {})",
        float_literal(rgb[0]),
        float_literal(rgb[1]),
        float_literal(rgb[2])
    )
}
