//! Audio clock
//!
//! Elapsed playback time is measured on the wall clock from the instant the
//! backend was told to start. Device state is polled separately and only
//! feeds [`PlaybackClock::is_playing`], which the playback loop uses for
//! termination; it never moves the elapsed time.

pub mod null;

pub use null::NullBackend;

use crate::wav::PcmAudio;
#[cfg(not(feature = "streaming"))]
use crate::PlayerError;
use crate::Result;
use std::time::{Duration, Instant};

/// Default time past the audio length during which device "playing"
/// reports are still believed
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Opaque audio output: play a PCM buffer, report whether it is still playing
pub trait AudioBackend {
    /// Load the PCM buffer and begin playback.
    ///
    /// Failing to acquire the output device is reported as
    /// [`PlayerError::Device`](crate::PlayerError::Device).
    fn start(&mut self, pcm: &PcmAudio) -> Result<()>;

    /// Whether the device still reports playback in progress.
    fn is_playing(&self) -> bool;

    /// Halt playback and release the device. Must be idempotent.
    fn stop(&mut self);

    /// Short backend name for logging.
    fn name(&self) -> &'static str;
}

impl<B: AudioBackend + ?Sized> AudioBackend for Box<B> {
    fn start(&mut self, pcm: &PcmAudio) -> Result<()> {
        (**self).start(pcm)
    }

    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Time source the playback loop synchronizes against
pub trait PlaybackClock {
    /// Begin (or restart) playback from position zero.
    fn start(&mut self) -> Result<()>;

    /// Time since start, clamped to `[0, total_duration]`.
    fn elapsed(&self) -> Duration;

    /// Whether audio is still considered playing.
    fn is_playing(&self) -> bool;

    /// Length of the audio being played.
    fn total_duration(&self) -> Duration;

    /// Stop playback. Idempotent.
    fn stop(&mut self);
}

/// Pick the PCM-derived duration, or the fallback when it is unusable
pub fn resolve_total_duration(computed: Duration, fallback: Duration) -> Duration {
    if computed.is_zero() {
        fallback
    } else {
        computed
    }
}

/// Duration estimate for `frame_count` frames at an assumed rate
///
/// Returns zero when the rate is not a positive finite number and saturates
/// at [`Duration::MAX`] when the estimate does not fit.
pub fn fallback_duration(frame_count: usize, assumed_fps: f64) -> Duration {
    if !assumed_fps.is_finite() || assumed_fps <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(frame_count as f64 / assumed_fps).unwrap_or(Duration::MAX)
}

/// Whether this build can produce sound
pub const fn has_audio_output() -> bool {
    cfg!(feature = "streaming")
}

/// The platform's audio output backend
///
/// Returns the rodio device when built with the `streaming` feature. Without
/// it there is no real output and a `Device` error is returned; callers that
/// want silence ask for a [`NullBackend`] explicitly.
pub fn default_backend() -> Result<Box<dyn AudioBackend>> {
    #[cfg(feature = "streaming")]
    {
        Ok(Box::new(crate::streaming::AudioDevice::new()))
    }
    #[cfg(not(feature = "streaming"))]
    {
        Err(PlayerError::Device(
            "built without the `streaming` feature, no audio output available".into(),
        ))
    }
}

/// Wall-clock playback clock around an audio backend
pub struct AudioClock<B: AudioBackend> {
    backend: B,
    pcm: Option<PcmAudio>,
    total_duration: Duration,
    drain_grace: Duration,
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
}

impl<B: AudioBackend> AudioClock<B> {
    /// Create a clock that plays `pcm` through `backend`
    ///
    /// `fallback` is used as the total duration if the PCM-derived one is zero.
    pub fn new(backend: B, pcm: PcmAudio, fallback: Duration) -> Self {
        let total_duration = resolve_total_duration(pcm.duration(), fallback);
        AudioClock {
            backend,
            pcm: Some(pcm),
            total_duration,
            drain_grace: DEFAULT_DRAIN_GRACE,
            started_at: None,
            stopped_at: None,
        }
    }

    /// Create a clock with no audio to play, running for `duration`
    pub fn silent(backend: B, duration: Duration) -> Self {
        AudioClock {
            backend,
            pcm: None,
            total_duration: duration,
            drain_grace: DEFAULT_DRAIN_GRACE,
            started_at: None,
            stopped_at: None,
        }
    }

    /// Override how long past the audio length device reports are trusted
    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    /// The wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Whether the clock has been started and not stopped
    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_at.is_none()
    }

    /// Unclamped time between start and `now` (or the stop instant)
    fn raw_elapsed_at(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(start) => self.stopped_at.unwrap_or(now).saturating_duration_since(start),
            None => Duration::ZERO,
        }
    }

    /// Clamped elapsed time as observed at `now`
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        self.raw_elapsed_at(now).min(self.total_duration)
    }

    /// Playing state as observed at `now`
    pub fn is_playing_at(&self, now: Instant) -> bool {
        self.is_running()
            && self.raw_elapsed_at(now) < self.total_duration.saturating_add(self.drain_grace)
            && (self.pcm.is_none() || self.backend.is_playing())
    }
}

impl<B: AudioBackend> PlaybackClock for AudioClock<B> {
    fn start(&mut self) -> Result<()> {
        if self.is_running() {
            self.backend.stop();
        }
        if let Some(pcm) = &self.pcm {
            self.backend.start(pcm)?;
        }
        self.started_at = Some(Instant::now());
        self.stopped_at = None;
        tracing::debug!(
            backend = self.backend.name(),
            total_ms = self.total_duration.as_millis() as u64,
            "audio clock started"
        );
        Ok(())
    }

    fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    fn is_playing(&self) -> bool {
        self.is_playing_at(Instant::now())
    }

    fn total_duration(&self) -> Duration {
        self.total_duration
    }

    fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.backend.stop();
        self.stopped_at = Some(Instant::now());
        tracing::debug!(backend = self.backend.name(), "audio clock stopped");
    }
}

impl<B: AudioBackend> Drop for AudioClock<B> {
    fn drop(&mut self) {
        self.stop();
    }
}
