//! Playback synchronization engine
//!
//! Drives the frame sequence from the audio clock:
//! - query the clock for elapsed time
//! - map it to a frame index
//! - render and present the frame only when the index changes
//! - sleep a third of a frame and repeat
//!
//! A run ends once the audio has stopped and the final frame is on screen,
//! restarts from the first frame when looping, and stops the audio on every
//! exit path.

pub mod indexer;
pub mod session;

pub use indexer::{index_for, tick_interval, FrameDurationPolicy};
pub use session::{PlaybackPhase, PlaybackSession};

use crate::clock::PlaybackClock;
use crate::frames::FrameSequence;
use crate::render::FrameRenderer;
use crate::screen::Screen;
use crate::Result;
use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Lower bound of the sleep between ticks
pub const DEFAULT_MIN_SLEEP: Duration = Duration::from_millis(1);

/// Cooperative stop request, observed at the top of every tick
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an untriggered token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether a stop was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for a playback run
#[derive(Debug, Clone, Copy)]
pub struct PlaybackOptions {
    /// How long each frame is shown
    pub policy: FrameDurationPolicy,
    /// Restart from the first frame when the audio ends
    pub loop_playback: bool,
    /// Lower bound of the sleep between ticks
    pub min_sleep: Duration,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        PlaybackOptions {
            policy: FrameDurationPolicy::EvenlyDistributed,
            loop_playback: false,
            min_sleep: DEFAULT_MIN_SLEEP,
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The frame sequence was empty; nothing was started
    NothingToPlay,
    /// Audio ended with the final frame shown
    Completed,
    /// Stopped through the cancel token
    Cancelled,
}

/// Counters for monitoring a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Loop iterations
    pub ticks: u64,
    /// Frames written to the screen
    pub frames_rendered: u64,
    /// Frames skipped because rendering failed
    pub render_failures: u64,
    /// Passes over the sequence started
    pub passes: u32,
    /// Last frame index handled
    pub last_index: Option<usize>,
}

/// Stops the clock whenever the run leaves scope, including on `?`
struct ClockGuard<'a, C: PlaybackClock>(&'a mut C);

impl<C: PlaybackClock> Deref for ClockGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        &*self.0
    }
}

impl<C: PlaybackClock> DerefMut for ClockGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut *self.0
    }
}

impl<C: PlaybackClock> Drop for ClockGuard<'_, C> {
    fn drop(&mut self) {
        self.0.stop();
    }
}

/// Audio-synchronized frame scheduler
pub struct PlaybackLoop<C, R, S> {
    clock: C,
    renderer: R,
    screen: S,
    options: PlaybackOptions,
    cancel: CancelToken,
    stats: Arc<Mutex<PlaybackStats>>,
}

impl<C, R, S> PlaybackLoop<C, R, S>
where
    C: PlaybackClock,
    R: FrameRenderer,
    S: Screen,
{
    /// Create a playback loop
    pub fn new(clock: C, renderer: R, screen: S, options: PlaybackOptions) -> Self {
        PlaybackLoop {
            clock,
            renderer,
            screen,
            options,
            cancel: CancelToken::new(),
            stats: Arc::new(Mutex::new(PlaybackStats::default())),
        }
    }

    /// Use an externally owned cancel token
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops this loop when cancelled
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Shared statistics, readable while the loop runs
    pub fn stats_handle(&self) -> Arc<Mutex<PlaybackStats>> {
        Arc::clone(&self.stats)
    }

    /// Snapshot of the statistics
    pub fn stats(&self) -> PlaybackStats {
        self.stats.lock().clone()
    }

    /// The clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The renderer
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The screen
    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Play `frames` against the clock until the audio ends or the run is
    /// cancelled
    ///
    /// An empty sequence returns immediately without touching the audio.
    /// Clock start failures (device errors) and screen write failures are
    /// returned; a frame that fails to render is skipped and the previous
    /// one stays on screen.
    pub fn run(&mut self, frames: &FrameSequence) -> Result<PlaybackOutcome> {
        if frames.is_empty() {
            tracing::debug!("frame sequence empty, nothing to play");
            return Ok(PlaybackOutcome::NothingToPlay);
        }

        let frame_count = frames.len();
        let mut session = PlaybackSession::new(frame_count, self.options.loop_playback);
        let mut clock = ClockGuard(&mut self.clock);

        loop {
            clock.start()?;
            let total = clock.total_duration();
            let frame_duration = self.options.policy.frame_duration(total, frame_count);
            let interval = tick_interval(frame_duration, self.options.min_sleep);
            session.begin_pass();
            self.stats.lock().passes = session.passes();
            tracing::debug!(
                pass = session.passes(),
                frames = frame_count,
                frame_ms = frame_duration.as_secs_f64() * 1000.0,
                total_ms = total.as_millis() as u64,
                "playback pass started"
            );

            loop {
                if self.cancel.is_cancelled() {
                    clock.stop();
                    tracing::debug!(
                        phase = ?session.phase(),
                        last = ?session.last_rendered(),
                        "playback cancelled"
                    );
                    session.abort();
                    return Ok(PlaybackOutcome::Cancelled);
                }

                let elapsed = clock.elapsed();
                let index = index_for(elapsed, frame_duration, frame_count);

                if session.needs_render(index) {
                    let rendered = self.renderer.render(&frames[index], self.screen.viewport());
                    match rendered {
                        Ok(text) => {
                            self.screen.present(&text)?;
                            self.stats.lock().frames_rendered += 1;
                        }
                        Err(err) => {
                            tracing::debug!(index, error = %err, "frame render failed, keeping previous frame");
                            self.stats.lock().render_failures += 1;
                        }
                    }
                    session.mark_rendered(index);
                    self.stats.lock().last_index = Some(index);
                }
                self.stats.lock().ticks += 1;

                let saturated = elapsed >= total;
                if session.pass_complete(clock.is_playing(), saturated) {
                    break;
                }

                std::thread::sleep(interval);
            }

            clock.stop();
            if !session.finish_pass() {
                tracing::debug!(passes = session.passes(), "playback complete");
                return Ok(PlaybackOutcome::Completed);
            }
            tracing::debug!("looping back to first frame");
        }
    }
}
