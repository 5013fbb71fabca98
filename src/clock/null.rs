//! Silent audio backend
//!
//! Used where no audio device is available (or compiled in). It accepts any
//! PCM buffer and reports playing until stopped; the clock's drain grace
//! bounds how long that report is believed.

use super::AudioBackend;
use crate::wav::PcmAudio;
use crate::Result;

/// Backend that plays nothing
#[derive(Debug, Default)]
pub struct NullBackend {
    playing: bool,
    starts: usize,
}

impl NullBackend {
    /// Create a new silent backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times playback was started
    pub fn starts(&self) -> usize {
        self.starts
    }
}

impl AudioBackend for NullBackend {
    fn start(&mut self, pcm: &PcmAudio) -> Result<()> {
        tracing::trace!(
            channels = pcm.channels(),
            sample_rate = pcm.sample_rate(),
            "null backend start"
        );
        self.playing = true;
        self.starts += 1;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
