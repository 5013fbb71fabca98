//! Audio device integration using rodio
//!
//! The output stream is opened lazily in [`AudioBackend::start`] so that a
//! missing device surfaces as a start failure, and is released again on
//! [`AudioBackend::stop`] or drop.

use crate::clock::AudioBackend;
use crate::wav::PcmAudio;
use crate::{PlayerError, Result};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

/// Audio playback device using rodio
#[derive(Default)]
pub struct AudioDevice {
    stream: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
}

impl AudioDevice {
    /// Create an idle device handle; nothing is opened until playback starts
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an output stream is currently held open
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn release(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.stream = None;
    }
}

impl AudioBackend for AudioDevice {
    fn start(&mut self, pcm: &PcmAudio) -> Result<()> {
        self.release();

        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| PlayerError::Device(format!("Failed to create audio stream: {}", e)))?;

        let sink = Sink::try_new(&stream_handle)
            .map_err(|e| PlayerError::Device(format!("Failed to create audio sink: {}", e)))?;

        let source = SamplesBuffer::new(pcm.channels(), pcm.sample_rate(), pcm.to_i16_samples());
        sink.append(source);

        self.stream = Some((stream, stream_handle));
        self.sink = Some(sink);
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .map(|sink| !sink.empty() && !sink.is_paused())
            .unwrap_or(false)
    }

    fn stop(&mut self) {
        self.release();
    }

    fn name(&self) -> &'static str {
        "rodio"
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.release();
    }
}
