//! GIMP gradient (`.ggr`) import.
//!
//! A gradient becomes a periodic colour fragment: the escape value is scaled
//! by `0.05`, wrapped into `[0, 1)` and run through one branch per segment.

use crate::error::GgrError;
use crate::glsl::{float_literal, vec3_literal};
use std::fmt::Write;

const HEADER: &str = "GIMP Gradient";

/// One segment of a GIMP gradient. Colours are RGBA in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientSegment {
    pub left: f64,
    pub mid: f64,
    pub right: f64,
    pub color1: [f64; 4],
    pub color2: [f64; 4],
    pub blend: i64,
    pub color_space: i64,
    pub color_type: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    pub name: String,
    pub segments: Vec<GradientSegment>,
}

pub fn parse_ggr(text: &str) -> Result<Gradient, GgrError> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 3 || lines[0].trim_end() != HEADER {
        return Err(GgrError::NotGimpGradient);
    }

    let (key, value) = lines[1]
        .split_once(':')
        .ok_or_else(|| GgrError::IllegalHeader("missing name line".to_string()))?;
    if key.trim() != "Name" {
        return Err(GgrError::IllegalHeader(format!("expected Name, got {}", key.trim())));
    }
    let name = value.trim().to_string();

    let segment_count: usize = lines[2]
        .trim()
        .parse()
        .map_err(|_| GgrError::IllegalHeader(format!("bad segment count {:?}", lines[2])))?;

    let segments = (0..segment_count)
        .map(|index| {
            let line_no = index + 3;
            let line = lines.get(line_no).ok_or_else(|| GgrError::BadSegment {
                line: line_no + 1,
                reason: "missing segment".to_string(),
            })?;
            parse_segment(line).map_err(|reason| GgrError::BadSegment {
                line: line_no + 1,
                reason,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Gradient { name, segments })
}

fn parse_segment(line: &str) -> Result<GradientSegment, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 13 {
        return Err(format!("expected at least 13 fields, got {}", fields.len()));
    }
    let floats = fields[..11]
        .iter()
        .map(|f| f.parse::<f64>().map_err(|e| format!("{f:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    let ints = fields[11..]
        .iter()
        .map(|f| f.parse::<i64>().map_err(|e| format!("{f:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GradientSegment {
        left: floats[0],
        mid: floats[1],
        right: floats[2],
        color1: [floats[3], floats[4], floats[5], floats[6]],
        color2: [floats[7], floats[8], floats[9], floats[10]],
        blend: ints[0],
        color_space: ints[1],
        color_type: ints.get(2).copied().unwrap_or(0),
    })
}

fn rgb(color: [f64; 4]) -> [f64; 3] {
    [color[0], color[1], color[2]]
}

impl Gradient {
    /// camelCase identifier derived from the gradient name.
    pub fn key(&self) -> String {
        self.name
            .split(|c: char| !(c.is_ascii_alphabetic() || c == '_'))
            .enumerate()
            .map(|(i, word)| {
                if i == 0 {
                    word.to_lowercase()
                } else {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => {
                            first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
                        }
                        None => String::new(),
                    }
                }
            })
            .collect()
    }

    /// Render the gradient as a colour fragment.
    pub fn to_formula(&self, reverse: bool) -> Result<String, GgrError> {
        let count = self.segments.len();
        let mut out = String::from("v *= 0.05;\nv = mod(v, 1.0);\nfloat t;\n");

        let ordered: Vec<&GradientSegment> = if reverse {
            self.segments.iter().rev().collect()
        } else {
            self.segments.iter().collect()
        };

        for (index, segment) in ordered.into_iter().enumerate() {
            if segment.color_space != 0 {
                return Err(GgrError::UnsupportedColorSpace(segment.color_space));
            }

            let (mut left, mut mid, mut right) = (segment.left, segment.mid, segment.right);
            let (mut color1, mut color2) = (rgb(segment.color1), rgb(segment.color2));
            if reverse {
                (left, right) = (1.0 - right, 1.0 - left);
                mid = 1.0 - mid;
                std::mem::swap(&mut color1, &mut color2);
            }
            let last = index + 1 >= count;

            if index > 0 {
                out.push_str(" else ");
            }

            if color1 == color2 {
                open_branch(&mut out, last, right);
                let _ = writeln!(out, "    color = {};", vec3_literal(color1));
            } else if ((right + left) / 2.0 - mid).abs() < 0.000_001 {
                open_branch(&mut out, last, right);
                write_ramp(&mut out, index, left, right);
                let _ = writeln!(
                    out,
                    "    color = mix({}, {}, t);",
                    vec3_literal(color1),
                    vec3_literal(color2)
                );
            } else {
                // Split at the midpoint into two linear pieces.
                let _ = write!(out, "if (v < {}) {{\n", float_literal(mid));
                write_ramp(&mut out, index, left, mid);

                let t1 = (mid - left) / (right - left);
                let t2 = 1.0 - t1;
                let mid_color: [f64; 3] = std::array::from_fn(|i| color1[i] * t1 + color2[i] * t2);

                let _ = writeln!(
                    out,
                    "    color = mix({}, {}, t);",
                    vec3_literal(color1),
                    vec3_literal(mid_color)
                );
                out.push_str("} else ");

                open_branch(&mut out, last, right);
                let _ = writeln!(
                    out,
                    "    t = (v - {}) * {};",
                    float_literal(mid),
                    float_literal(1.0 / (right - mid))
                );
                let _ = writeln!(
                    out,
                    "    color = mix({}, {}, t);",
                    vec3_literal(mid_color),
                    vec3_literal(color2)
                );
            }
            out.push('}');
        }

        out.push_str("\ncolor = pow(color, vec3(1.0 / 2.2));\n");
        Ok(out)
    }
}

fn open_branch(out: &mut String, last: bool, right: f64) {
    if last {
        out.push_str("{\n");
    } else {
        let _ = write!(out, "if (v < {}) {{\n", float_literal(right));
    }
}

fn write_ramp(out: &mut String, index: usize, from: f64, to: f64) {
    let inverse = float_literal(1.0 / (to - from));
    if index > 0 {
        let _ = writeln!(out, "    t = (v - {}) * {};", float_literal(from), inverse);
    } else {
        let _ = writeln!(out, "    t = v * {inverse};");
    }
}
