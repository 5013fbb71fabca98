//! Frame sequence
//!
//! Frames are produced upstream (for example by an `ffmpeg` extraction step)
//! as numbered files such as `frame_0001.png`. A sequence is ordered by that
//! number and never changes once loaded.

use crate::Result;
use std::ops::Index;
use std::path::{Path, PathBuf};

/// File extensions recognised as frames
pub const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "txt"];

/// One frame of the sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameHandle {
    /// Image file, or a pre-rendered `.txt` ASCII frame
    File(PathBuf),
    /// Pre-rendered ASCII frame held in memory
    Text(String),
}

/// Ordered, immutable list of frames
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    frames: Vec<FrameHandle>,
}

impl FrameSequence {
    /// Build a sequence from handles that are already in playback order
    pub fn from_handles(frames: Vec<FrameHandle>) -> Self {
        FrameSequence { frames }
    }

    /// Enumerate the frame files in `dir`
    ///
    /// A missing directory yields an empty sequence; other I/O failures are
    /// returned.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "frame directory missing");
            return Ok(Self::default());
        }

        let mut entries: Vec<(Option<u64>, String, PathBuf)> = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || !is_frame_file(&path) {
                continue;
            }
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            entries.push((frame_number(&path), name, path));
        }

        // Numbered frames first, in numeric order; the rest by name
        entries.sort_by(|a, b| match (a.0, b.0) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.1.cmp(&b.1)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.1.cmp(&b.1),
        });

        let numbers: Vec<Option<u64>> = entries.iter().map(|e| e.0).collect();
        if !numbers.is_empty() && !is_gapless(&numbers) {
            tracing::warn!(
                dir = %dir.display(),
                frames = numbers.len(),
                "frame numbering is not gapless from 1"
            );
        }

        let frames = entries
            .into_iter()
            .map(|(_, _, path)| FrameHandle::File(path))
            .collect();
        Ok(FrameSequence { frames })
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether there is nothing to play
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at `index`, if any
    pub fn get(&self, index: usize) -> Option<&FrameHandle> {
        self.frames.get(index)
    }

    /// Iterate frames in playback order
    pub fn iter(&self) -> std::slice::Iter<'_, FrameHandle> {
        self.frames.iter()
    }
}

impl Index<usize> for FrameSequence {
    type Output = FrameHandle;

    fn index(&self, index: usize) -> &FrameHandle {
        &self.frames[index]
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            FRAME_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Trailing decimal number of the file stem (`frame_0042.png` -> 42)
fn frame_number(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let digits_start = stem
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    stem[digits_start..].parse().ok()
}

fn is_gapless(numbers: &[Option<u64>]) -> bool {
    numbers
        .iter()
        .enumerate()
        .all(|(i, n)| *n == Some(i as u64 + 1))
}
