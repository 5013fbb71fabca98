//! Decoded PCM audio record

use crate::{PlayerError, Result};
use std::time::Duration;

/// Only supported sample width
pub const BITS_PER_SAMPLE: u16 = 16;

/// Immutable 16-bit linear PCM audio, as read from a WAV `data` chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmAudio {
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    samples: Vec<u8>,
}

impl PcmAudio {
    /// Build a PCM record, validating format and payload layout
    ///
    /// `samples` holds interleaved little-endian 16-bit samples; its length
    /// must be a positive multiple of the block alignment.
    pub fn new(
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
        samples: Vec<u8>,
    ) -> Result<Self> {
        if !(1..=2).contains(&channels) {
            return Err(PlayerError::Format(format!(
                "Unsupported channel count {} (expected 1 or 2)",
                channels
            )));
        }
        if sample_rate == 0 {
            return Err(PlayerError::Format("Sample rate must be positive".into()));
        }
        if bits_per_sample != BITS_PER_SAMPLE {
            return Err(PlayerError::Format(format!(
                "Unsupported bit depth {} (only 16-bit PCM is supported)",
                bits_per_sample
            )));
        }
        if samples.is_empty() {
            return Err(PlayerError::Format("WAV data chunk is empty".into()));
        }

        let block_align = channels as usize * (bits_per_sample as usize / 8);
        if samples.len() % block_align != 0 {
            return Err(PlayerError::Format(format!(
                "Data length {} is not a multiple of the block alignment {}",
                samples.len(),
                block_align
            )));
        }

        Ok(PcmAudio {
            channels,
            sample_rate,
            bits_per_sample,
            samples,
        })
    }

    /// Number of interleaved channels (1 or 2)
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Bits per sample (always 16)
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Raw little-endian PCM payload
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Bytes per sample frame (all channels)
    pub fn block_align(&self) -> usize {
        self.channels as usize * (self.bits_per_sample as usize / 8)
    }

    /// Number of sample frames (one sample per channel each)
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.block_align()
    }

    /// Playback length derived from payload size and format
    pub fn duration(&self) -> Duration {
        let byte_rate = self.block_align() as u128 * self.sample_rate as u128;
        let nanos = self.samples.len() as u128 * 1_000_000_000 / byte_rate;
        Duration::from_nanos(nanos as u64)
    }

    /// Decode the payload into interleaved signed samples
    pub fn to_i16_samples(&self) -> Vec<i16> {
        self.samples
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }
}
