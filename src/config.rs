//! Player configuration
//!
//! Every field has a default, so a JSON config file only needs the values it
//! changes. Command-line flags are applied on top.

use crate::playback::{FrameDurationPolicy, PlaybackOptions};
use crate::render::{AsciiRenderer, DEFAULT_CHARSET, DEFAULT_CHAR_ASPECT};
use crate::{PlayerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Slowest accepted fallback rate: one frame every 100 seconds
pub const MIN_FALLBACK_FPS: f64 = 0.01;

fn default_fallback_fps() -> f64 {
    24.0
}

fn default_char_aspect() -> f32 {
    DEFAULT_CHAR_ASPECT
}

fn default_charset() -> String {
    DEFAULT_CHARSET.to_string()
}

fn default_drain_grace_ms() -> u64 {
    250
}

fn default_min_sleep_ms() -> u64 {
    1
}

/// Playback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Fixed frame rate; `None` spreads frames evenly over the audio
    #[serde(default)]
    pub target_fps: Option<u32>,
    /// Restart when the audio ends
    #[serde(default)]
    pub loop_playback: bool,
    /// Assumed frame rate for estimating duration when no audio length is known
    #[serde(default = "default_fallback_fps")]
    pub fallback_fps: f64,
    /// Width/height ratio of a character cell
    #[serde(default = "default_char_aspect")]
    pub char_aspect: f32,
    /// Luminance ramp, darkest first
    #[serde(default = "default_charset")]
    pub charset: String,
    /// Milliseconds past the audio length that device "playing" reports are trusted
    #[serde(default = "default_drain_grace_ms")]
    pub drain_grace_ms: u64,
    /// Lower bound of the sleep between ticks, in milliseconds
    #[serde(default = "default_min_sleep_ms")]
    pub min_sleep_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            target_fps: None,
            loop_playback: false,
            fallback_fps: default_fallback_fps(),
            char_aspect: default_char_aspect(),
            charset: default_charset(),
            drain_grace_ms: default_drain_grace_ms(),
            min_sleep_ms: default_min_sleep_ms(),
        }
    }
}

impl PlayerConfig {
    /// Load and validate a JSON config file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            PlayerError::Config(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a JSON config document
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(text)
            .map_err(|e| PlayerError::Config(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.target_fps == Some(0) {
            return Err(PlayerError::Config("target_fps must be positive".into()));
        }
        if !self.fallback_fps.is_finite() || self.fallback_fps < MIN_FALLBACK_FPS {
            return Err(PlayerError::Config(format!(
                "fallback_fps must be at least {}, got {}",
                MIN_FALLBACK_FPS, self.fallback_fps
            )));
        }
        if !self.char_aspect.is_finite() || self.char_aspect <= 0.0 {
            return Err(PlayerError::Config(format!(
                "char_aspect must be a positive number, got {}",
                self.char_aspect
            )));
        }
        if self.charset.is_empty() {
            return Err(PlayerError::Config("charset must not be empty".into()));
        }
        if !self.charset.is_ascii() {
            return Err(PlayerError::Config(
                "charset contains non-ASCII characters".into(),
            ));
        }
        Ok(())
    }

    /// Frame duration policy for these settings
    pub fn frame_policy(&self) -> FrameDurationPolicy {
        FrameDurationPolicy::from_target_fps(self.target_fps)
    }

    /// Playback loop options for these settings
    pub fn playback_options(&self) -> PlaybackOptions {
        PlaybackOptions {
            policy: self.frame_policy(),
            loop_playback: self.loop_playback,
            min_sleep: Duration::from_millis(self.min_sleep_ms.max(1)),
        }
    }

    /// Drain grace as a duration
    pub fn drain_grace(&self) -> Duration {
        Duration::from_millis(self.drain_grace_ms)
    }

    /// Renderer configured with the charset and cell aspect
    pub fn renderer(&self) -> AsciiRenderer {
        AsciiRenderer::new(&self.charset, self.char_aspect)
    }
}
