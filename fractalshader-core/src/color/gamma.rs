//! Gamma conversion for 8-bit palette colours.
//!
//! Palette stops are authored as perceptually encoded 8-bit RGB. Corrected
//! gradients interpolate in linear space (`(c / 255)^2.2`) and re-encode
//! with `^(1 / 2.2)` afterwards, which keeps transition midpoints from
//! looking darker than either end.

pub const GAMMA: f64 = 2.2;

/// Treat an 8-bit channel as display-ready.
pub fn display_ready(channel: u8) -> f64 {
    channel as f64 / 255.0
}

/// Convert an 8-bit encoded channel to linear light.
pub fn linearize(channel: u8) -> f64 {
    (channel as f64 / 255.0).powf(GAMMA)
}

/// Re-encode a linear channel for display.
pub fn encode(linear: f64) -> f64 {
    linear.max(0.0).powf(1.0 / GAMMA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_fixed() {
        assert_eq!(linearize(0), 0.0);
        assert!((linearize(255) - 1.0).abs() < 1e-12);
        assert!((encode(1.0) - 1.0).abs() < 1e-12);
        assert_eq!(encode(0.0), 0.0);
    }

    #[test]
    fn encode_inverts_linearize() {
        for channel in [1u8, 17, 64, 128, 200, 254] {
            let back = encode(linearize(channel));
            assert!((back - display_ready(channel)).abs() < 1e-12);
        }
    }

    #[test]
    fn linear_midpoint_is_brighter_than_naive_midpoint() {
        let naive = (display_ready(0) + display_ready(255)) / 2.0;
        let corrected = encode((linearize(0) + linearize(255)) / 2.0);
        assert!(corrected > naive + 0.2, "{corrected} vs {naive}");
    }
}
