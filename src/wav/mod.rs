//! WAV PCM Domain
//!
//! Reads RIFF/WAVE containers into an immutable [`PcmAudio`] record that the
//! audio clock and backends consume.

pub mod parser;
pub mod pcm;

pub use parser::WavParser;
pub use pcm::PcmAudio;

use crate::{PlayerError, Result};
use std::path::Path;

/// Convenience function to load and parse a WAV file from disk
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<PcmAudio> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        PlayerError::Format(format!("Failed to read WAV file '{}': {}", path.display(), e))
    })?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "parsing wav");
    WavParser::parse(&data)
}
