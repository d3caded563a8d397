//! Serializable session state.
//!
//! Two forms: plain JSON, and a compact shareable string for URL fragments
//! (JSON, deflate, URL-safe base64, `v1:` prefix). The session exposes the
//! state through getters and setters; hosts decide where to store it.

use crate::animation::Animation;
use crate::fractal::FractalKind;
use crate::viewport::Viewport;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use flate2::{read::DeflateDecoder, write::DeflateEncoder, Compression};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

const URL_HASH_PREFIX: &str = "v1:";

/// Viewport, fractal kind and keyframes of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub fractal: FractalKind,
    pub viewport: Viewport,
    #[serde(default)]
    pub keyframes: Animation,
    /// Schema version for future migrations
    version: u32,
}

impl PersistedState {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(fractal: FractalKind, viewport: Viewport, keyframes: Animation) -> Self {
        Self {
            fractal,
            viewport,
            keyframes,
            version: Self::CURRENT_VERSION,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn to_json(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(json) => Some(json),
            Err(e) => {
                log::warn!("Failed to serialize state: {}", e);
                None
            }
        }
    }

    /// Parse JSON state. Returns `None` on malformed input or a version mismatch.
    pub fn from_json(json: &str) -> Option<PersistedState> {
        match serde_json::from_str::<PersistedState>(json) {
            Ok(state) => state.accept_version(),
            Err(e) => {
                log::warn!("Failed to parse persisted state: {}", e);
                None
            }
        }
    }

    fn accept_version(self) -> Option<PersistedState> {
        // Only accept current version (future: add migration logic)
        if self.version == Self::CURRENT_VERSION {
            Some(self)
        } else {
            log::warn!(
                "Ignoring state with version {} (current: {})",
                self.version,
                Self::CURRENT_VERSION
            );
            None
        }
    }
}

/// Encode state to a compressed, URL-safe string.
pub fn encode_state(state: &PersistedState) -> Option<String> {
    let json = state.to_json()?;

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(json.as_bytes()).ok()?;
    let compressed = encoder.finish().ok()?;

    let encoded = URL_SAFE_NO_PAD.encode(&compressed);
    Some(format!("{URL_HASH_PREFIX}{encoded}"))
}

/// Decode state from a compressed, URL-safe string. A leading `#` is ignored.
pub fn decode_state(encoded: &str) -> Option<PersistedState> {
    let encoded = encoded.strip_prefix('#').unwrap_or(encoded);
    let Some(data) = encoded.strip_prefix(URL_HASH_PREFIX) else {
        log::warn!("Ignoring state without {URL_HASH_PREFIX} prefix");
        return None;
    };

    let compressed = URL_SAFE_NO_PAD.decode(data).ok()?;

    let mut decoder = DeflateDecoder::new(&compressed[..]);
    let mut json = String::new();
    decoder.read_to_string(&mut json).ok()?;

    PersistedState::from_json(&json)
}
