//! Per-run playback state
//!
//! A session owns the "last rendered" index and the phase of the run. It is
//! driven by a single thread of control and shared with nobody.

/// Phase of a playback run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// Audio being loaded and started
    Priming,
    /// Frames following the clock
    Rendering,
    /// Final frame reached, waiting for the audio to end
    Draining,
    /// Finished
    Done,
}

/// State of one playback run
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    frame_count: usize,
    loop_enabled: bool,
    last_rendered: Option<usize>,
    phase: PlaybackPhase,
    passes: u32,
}

impl PlaybackSession {
    /// New session in the `Priming` phase
    pub fn new(frame_count: usize, loop_enabled: bool) -> Self {
        PlaybackSession {
            frame_count,
            loop_enabled,
            last_rendered: None,
            phase: PlaybackPhase::Priming,
            passes: 0,
        }
    }

    /// Enter `Rendering` for a fresh pass over the sequence
    pub fn begin_pass(&mut self) {
        self.last_rendered = None;
        self.phase = PlaybackPhase::Rendering;
        self.passes += 1;
    }

    /// Whether `index` differs from the last frame handled
    pub fn needs_render(&self, index: usize) -> bool {
        self.last_rendered != Some(index)
    }

    /// Record that `index` has been handled (drawn, or skipped after a
    /// failed render). Indices never move backwards within a pass.
    pub fn mark_rendered(&mut self, index: usize) {
        debug_assert!(self.last_rendered.map_or(true, |last| index >= last));
        self.last_rendered = Some(index);
        if index + 1 >= self.frame_count && self.phase == PlaybackPhase::Rendering {
            self.phase = PlaybackPhase::Draining;
        }
    }

    /// Whether the run can leave this pass
    ///
    /// The audio must have stopped, and either the final frame has been
    /// handled (`Draining`) or the clock is saturated so no later frame can
    /// be chosen.
    pub fn pass_complete(&self, audio_playing: bool, clock_saturated: bool) -> bool {
        let drained = self.phase == PlaybackPhase::Draining;
        !audio_playing && (drained || (clock_saturated && self.phase == PlaybackPhase::Rendering))
    }

    /// Move to `Done`, or back to `Priming` when looping
    ///
    /// Returns `true` when another pass should start.
    pub fn finish_pass(&mut self) -> bool {
        if self.loop_enabled {
            self.phase = PlaybackPhase::Priming;
            true
        } else {
            self.phase = PlaybackPhase::Done;
            false
        }
    }

    /// Stop without finishing (cancellation)
    pub fn abort(&mut self) {
        self.phase = PlaybackPhase::Done;
    }

    /// Current phase
    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// Last frame index handled in this pass
    pub fn last_rendered(&self) -> Option<usize> {
        self.last_rendered
    }

    /// Passes started so far
    pub fn passes(&self) -> u32 {
        self.passes
    }
}
