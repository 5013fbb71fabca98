//! Elapsed time to frame index mapping

use std::time::Duration;

/// How long each frame stays on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameDurationPolicy {
    /// Fixed rate: each frame lasts `1/fps`
    TargetFps(u32),
    /// Spread the frames evenly over the audio length
    #[default]
    EvenlyDistributed,
}

impl FrameDurationPolicy {
    /// Policy for an optional target rate; absent or zero means even spread
    pub fn from_target_fps(fps: Option<u32>) -> Self {
        match fps {
            Some(fps) if fps > 0 => FrameDurationPolicy::TargetFps(fps),
            _ => FrameDurationPolicy::EvenlyDistributed,
        }
    }

    /// Resolve the per-frame duration for a session
    pub fn frame_duration(&self, total_duration: Duration, frame_count: usize) -> Duration {
        match *self {
            FrameDurationPolicy::TargetFps(fps) if fps > 0 => Duration::from_secs(1) / fps,
            _ if frame_count == 0 => total_duration,
            _ => {
                let nanos = total_duration.as_nanos() / frame_count as u128;
                u64::try_from(nanos)
                    .map(Duration::from_nanos)
                    .unwrap_or(Duration::MAX)
            }
        }
    }
}

/// Frame index for `elapsed`: `floor(elapsed / frame_duration)` clamped to
/// `[0, frame_count - 1]`
///
/// A zero `frame_duration` selects the last frame once any time has passed.
/// `frame_count == 0` is not meaningful and yields 0.
pub fn index_for(elapsed: Duration, frame_duration: Duration, frame_count: usize) -> usize {
    let last = frame_count.saturating_sub(1);
    if frame_duration.is_zero() {
        return if elapsed.is_zero() { 0 } else { last };
    }
    let index = elapsed.as_nanos() / frame_duration.as_nanos();
    index.min(last as u128) as usize
}

/// Sleep between ticks: a third of a frame, but never below `min_sleep`
pub fn tick_interval(frame_duration: Duration, min_sleep: Duration) -> Duration {
    (frame_duration / 3).max(min_sleep)
}
