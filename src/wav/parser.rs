//! RIFF/WAVE parser for 16-bit linear PCM
//!
//! A WAV file is a RIFF container: a 12-byte header (`RIFF`, size, `WAVE`)
//! followed by chunks of `(4-byte id, u32 LE size, payload)`.
//!
//! Format details:
//! - `fmt `: at least 16 bytes (format code, channels, rate, byte rate,
//!   block align, bits per sample); extension bytes are skipped
//! - `data`: raw interleaved PCM samples
//! - Any other chunk is skipped
//! - Odd-sized chunks are followed by one pad byte
//! - Chunk order is not assumed (`data` may precede `fmt `)

use super::pcm::{PcmAudio, BITS_PER_SAMPLE};
use crate::{PlayerError, Result};
use nom::bytes::complete::take;
use nom::combinator::map;
use nom::number::complete::{le_u16, le_u32};
use nom::sequence::{pair, tuple};
use nom::IResult;

/// Size of the `RIFF....WAVE` preamble
pub const RIFF_HEADER_LEN: usize = 12;

/// Mandatory part of the `fmt ` chunk
pub const FMT_CHUNK_MIN_LEN: usize = 16;

/// Linear PCM format code
pub const WAVE_FORMAT_PCM: u16 = 1;

/// Chunk preamble: 4-character id and declared payload size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChunkHeader {
    id: [u8; 4],
    size: u32,
}

/// Mandatory `fmt ` fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FmtChunk {
    format_code: u16,
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

fn chunk_header(input: &[u8]) -> IResult<&[u8], ChunkHeader> {
    map(pair(take(4usize), le_u32), |(id, size): (&[u8], u32)| {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(id);
        ChunkHeader { id: tag, size }
    })(input)
}

fn fmt_fields(input: &[u8]) -> IResult<&[u8], FmtChunk> {
    map(
        tuple((le_u16, le_u16, le_u32, le_u32, le_u16, le_u16)),
        |(format_code, channels, sample_rate, byte_rate, block_align, bits_per_sample)| FmtChunk {
            format_code,
            channels,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
        },
    )(input)
}

/// WAV PCM parser
pub struct WavParser;

impl WavParser {
    /// Parse a complete WAV file image into PCM audio
    pub fn parse(data: &[u8]) -> Result<PcmAudio> {
        if data.len() < RIFF_HEADER_LEN {
            return Err(PlayerError::Format(format!(
                "WAV data too small for RIFF header ({} bytes)",
                data.len()
            )));
        }
        if &data[0..4] != b"RIFF" {
            return Err(PlayerError::Format("Invalid RIFF magic".into()));
        }
        if &data[8..12] != b"WAVE" {
            return Err(PlayerError::Format("Invalid WAVE form type".into()));
        }

        let mut rest = &data[RIFF_HEADER_LEN..];
        let mut fmt: Option<FmtChunk> = None;
        let mut payload: Option<&[u8]> = None;

        while fmt.is_none() || payload.is_none() {
            let Ok((body, header)) = chunk_header(rest) else {
                break;
            };
            let size = header.size as usize;
            if size > body.len() {
                tracing::debug!(
                    chunk = %String::from_utf8_lossy(&header.id),
                    declared = size,
                    available = body.len(),
                    "truncated chunk, stopping"
                );
                break;
            }

            let (content, after) = body.split_at(size);
            match &header.id {
                b"fmt " => fmt = Some(Self::parse_fmt(content)?),
                b"data" => payload = Some(content),
                other => {
                    tracing::trace!(chunk = %String::from_utf8_lossy(other), size, "skipping chunk");
                }
            }

            rest = after;
            if size % 2 == 1 && !rest.is_empty() {
                rest = &rest[1..];
            }
        }

        match (fmt, payload) {
            (Some(fmt), Some(samples)) => PcmAudio::new(
                fmt.channels,
                fmt.sample_rate,
                fmt.bits_per_sample,
                samples.to_vec(),
            ),
            (None, _) => Err(PlayerError::Format("Missing fmt chunk".into())),
            (Some(_), None) => Err(PlayerError::Format("Missing or truncated data chunk".into())),
        }
    }

    /// Decode and validate the mandatory `fmt ` fields
    fn parse_fmt(content: &[u8]) -> Result<FmtChunk> {
        if content.len() < FMT_CHUNK_MIN_LEN {
            return Err(PlayerError::Format(format!(
                "fmt chunk too short ({} bytes, need {})",
                content.len(),
                FMT_CHUNK_MIN_LEN
            )));
        }

        let (_, fmt) = fmt_fields(content)
            .map_err(|e| PlayerError::Format(format!("Malformed fmt chunk: {}", e)))?;

        if fmt.format_code != WAVE_FORMAT_PCM {
            return Err(PlayerError::Format(format!(
                "Unsupported audio format code {} (only linear PCM)",
                fmt.format_code
            )));
        }
        if fmt.bits_per_sample != BITS_PER_SAMPLE {
            return Err(PlayerError::Format(format!(
                "Unsupported bit depth {} (only 16-bit PCM)",
                fmt.bits_per_sample
            )));
        }
        if !(1..=2).contains(&fmt.channels) {
            return Err(PlayerError::Format(format!(
                "Unsupported channel count {}",
                fmt.channels
            )));
        }

        let expected_align = fmt.channels * (fmt.bits_per_sample / 8);
        if fmt.block_align != expected_align
            || fmt.sample_rate.checked_mul(expected_align as u32) != Some(fmt.byte_rate)
        {
            // Derived fields are informational; the payload is sized from channels/bits.
            tracing::debug!(
                block_align = fmt.block_align,
                byte_rate = fmt.byte_rate,
                "inconsistent derived fmt fields"
            );
        }

        Ok(fmt)
    }
}
