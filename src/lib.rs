//! ASCII-art video playback synchronized to a WAV soundtrack
//!
//! Plays a directory of pre-extracted video frames as ASCII art in the
//! terminal while the matching audio track plays, picking the frame for each
//! instant from the audio clock rather than from a free-running timer.
//!
//! # Features
//! - RIFF/WAVE PCM parsing tolerant of chunk order and padding
//! - Wall-clock audio clock decoupled from device state reporting
//! - Pure elapsed-time to frame-index mapping
//! - Render-on-change playback loop with cooperative cancellation
//! - Luminance-ramp image to ASCII conversion
//!
//! # Crate feature flags
//! - `streaming` (default): Real audio output through rodio (`streaming::AudioDevice`)
//!
//! # Quick start
//! ```no_run
//! use asciiplay::clock::{default_backend, AudioClock};
//! use asciiplay::frames::FrameSequence;
//! use asciiplay::playback::{PlaybackLoop, PlaybackOptions};
//! use asciiplay::render::AsciiRenderer;
//! use asciiplay::screen::TerminalScreen;
//! use std::time::Duration;
//!
//! # fn main() -> asciiplay::Result<()> {
//! let pcm = asciiplay::wav::load_wav("clip/audio.wav")?;
//! let frames = FrameSequence::from_dir("clip/frames")?;
//! let clock = AudioClock::new(default_backend()?, pcm, Duration::from_secs(1));
//! let mut player = PlaybackLoop::new(
//!     clock,
//!     AsciiRenderer::default(),
//!     TerminalScreen::enter()?,
//!     PlaybackOptions::default(),
//! );
//! player.run(&frames)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod clock; // Audio clock & backends
pub mod config; // Player configuration
pub mod frames; // Frame sequence enumeration
pub mod playback; // Synchronization engine
pub mod render; // Frame to ASCII conversion
pub mod screen; // Terminal output & key input
#[cfg(feature = "streaming")]
pub mod streaming; // Real audio output
pub mod wav; // WAV PCM parsing

/// Error types for playback operations
#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    /// Malformed or unsupported WAV data
    #[error("Format error: {0}")]
    Format(String),

    /// Audio backend could not be acquired or started
    #[error("Audio device error: {0}")]
    Device(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error from filesystem or terminal
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for PlayerError {
    /// Converts a String into `PlayerError::Other`.
    ///
    /// Prefer the specific variants (`Format`, `Device`, `Config`) where the
    /// failure class is known; callers match on them.
    fn from(msg: String) -> Self {
        PlayerError::Other(msg)
    }
}

impl From<&str> for PlayerError {
    fn from(msg: &str) -> Self {
        PlayerError::Other(msg.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlayerError>;

// Public API exports
pub use clock::{AudioBackend, AudioClock, NullBackend, PlaybackClock};
pub use config::PlayerConfig;
pub use frames::{FrameHandle, FrameSequence};
pub use playback::{
    index_for, CancelToken, FrameDurationPolicy, PlaybackLoop, PlaybackOptions, PlaybackOutcome,
    PlaybackStats,
};
pub use render::{AsciiRenderer, FrameRenderer, RenderError};
pub use screen::{Screen, TerminalScreen, Viewport};
#[cfg(feature = "streaming")]
pub use streaming::AudioDevice;
pub use wav::{load_wav, PcmAudio, WavParser};
