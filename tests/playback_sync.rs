use asciiplay::clock::PlaybackClock;
use asciiplay::playback::FrameDurationPolicy;
use asciiplay::render::RenderError;
use asciiplay::screen::Viewport;
use asciiplay::{
    index_for, AudioClock, CancelToken, FrameHandle, FrameRenderer, FrameSequence, NullBackend,
    PcmAudio, PlaybackLoop, PlaybackOptions, PlaybackOutcome, PlayerError, Result, Screen,
};
use std::cell::Cell;
use std::time::Duration;

/// Clock that advances by a fixed step every time it is read
struct ScriptedClock {
    total: Duration,
    step: Duration,
    playing_until: Duration,
    fail_start: bool,
    now: Cell<Duration>,
    running: bool,
    starts: u32,
    stops: u32,
}

impl ScriptedClock {
    fn new(total: Duration, step: Duration) -> Self {
        ScriptedClock {
            total,
            step,
            playing_until: total + Duration::from_millis(10),
            fail_start: false,
            now: Cell::new(Duration::ZERO),
            running: false,
            starts: 0,
            stops: 0,
        }
    }

    fn playing_until(mut self, until: Duration) -> Self {
        self.playing_until = until;
        self
    }

    fn failing(mut self) -> Self {
        self.fail_start = true;
        self
    }
}

impl PlaybackClock for ScriptedClock {
    fn start(&mut self) -> Result<()> {
        if self.fail_start {
            return Err(PlayerError::Device("no output device".into()));
        }
        self.starts += 1;
        self.running = true;
        self.now.set(Duration::ZERO);
        Ok(())
    }

    fn elapsed(&self) -> Duration {
        let now = self.now.get();
        if self.running {
            self.now.set(now + self.step);
        }
        now.min(self.total)
    }

    fn is_playing(&self) -> bool {
        self.running && self.now.get() < self.playing_until
    }

    fn total_duration(&self) -> Duration {
        self.total
    }

    fn stop(&mut self) {
        if self.running {
            self.stops += 1;
        }
        self.running = false;
    }
}

/// Renders text frames verbatim; a frame reading "fail" fails to render
#[derive(Default)]
struct RecordingRenderer {
    attempts: Vec<String>,
    cancel_after: Option<(CancelToken, usize)>,
}

impl RecordingRenderer {
    fn cancelling(token: CancelToken, renders: usize) -> Self {
        RecordingRenderer {
            attempts: Vec::new(),
            cancel_after: Some((token, renders)),
        }
    }
}

impl FrameRenderer for RecordingRenderer {
    fn render(
        &mut self,
        frame: &FrameHandle,
        _viewport: Viewport,
    ) -> std::result::Result<String, RenderError> {
        let FrameHandle::Text(text) = frame else {
            return Err(RenderError::Unsupported("file frame".into()));
        };
        self.attempts.push(text.clone());
        if let Some((token, renders)) = &self.cancel_after {
            if self.attempts.len() >= *renders {
                token.cancel();
            }
        }
        if text == "fail" {
            return Err(RenderError::Unsupported("corrupt frame".into()));
        }
        Ok(text.clone())
    }
}

#[derive(Default)]
struct RecordingScreen {
    presented: Vec<String>,
}

impl Screen for RecordingScreen {
    fn viewport(&self) -> Viewport {
        Viewport { cols: 80, rows: 24 }
    }

    fn present(&mut self, text: &str) -> Result<()> {
        self.presented.push(text.to_owned());
        Ok(())
    }
}

fn text_frames(labels: &[&str]) -> FrameSequence {
    FrameSequence::from_handles(
        labels
            .iter()
            .map(|label| FrameHandle::Text((*label).to_owned()))
            .collect(),
    )
}

fn five_frames() -> FrameSequence {
    text_frames(&["0", "1", "2", "3", "4"])
}

fn options() -> PlaybackOptions {
    PlaybackOptions {
        min_sleep: Duration::from_millis(1),
        ..PlaybackOptions::default()
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_plays_every_frame_then_stops() {
    // device stops exactly when the clock reaches the end of the audio
    let clock = ScriptedClock::new(ms(50), ms(2)).playing_until(ms(50));
    let mut player = PlaybackLoop::new(
        clock,
        RecordingRenderer::default(),
        RecordingScreen::default(),
        options(),
    );

    let outcome = player.run(&five_frames()).unwrap();

    assert_eq!(outcome, PlaybackOutcome::Completed);
    assert_eq!(player.screen().presented, ["0", "1", "2", "3", "4"]);
    assert_eq!(player.clock().starts, 1);
    assert!(!player.clock().running);
    let stats = player.stats();
    assert_eq!(stats.frames_rendered, 5);
    assert_eq!(stats.last_index, Some(4));
    assert_eq!(stats.passes, 1);
    assert!(stats.ticks >= 5);
}

#[test]
fn test_empty_sequence_is_a_no_op() {
    let mut player = PlaybackLoop::new(
        ScriptedClock::new(ms(50), ms(2)),
        RecordingRenderer::default(),
        RecordingScreen::default(),
        options(),
    );

    let outcome = player.run(&FrameSequence::default()).unwrap();

    assert_eq!(outcome, PlaybackOutcome::NothingToPlay);
    assert_eq!(player.clock().starts, 0);
    assert!(player.renderer().attempts.is_empty());
    assert!(player.screen().presented.is_empty());
}

#[test]
fn test_render_failure_keeps_previous_frame() {
    let mut player = PlaybackLoop::new(
        ScriptedClock::new(ms(50), ms(2)),
        RecordingRenderer::default(),
        RecordingScreen::default(),
        options(),
    );

    let outcome = player.run(&text_frames(&["0", "1", "fail", "3", "4"])).unwrap();

    assert_eq!(outcome, PlaybackOutcome::Completed);
    assert_eq!(player.screen().presented, ["0", "1", "3", "4"]);
    // a failed frame is not retried on later ticks
    assert_eq!(player.renderer().attempts, ["0", "1", "fail", "3", "4"]);
    assert_eq!(player.stats().render_failures, 1);
}

#[test]
fn test_device_failure_is_fatal() {
    let mut player = PlaybackLoop::new(
        ScriptedClock::new(ms(50), ms(2)).failing(),
        RecordingRenderer::default(),
        RecordingScreen::default(),
        options(),
    );

    let err = player.run(&five_frames()).unwrap_err();

    assert!(matches!(err, PlayerError::Device(_)));
    assert!(player.screen().presented.is_empty());
}

#[test]
fn test_cancel_before_first_tick() {
    let mut player = PlaybackLoop::new(
        ScriptedClock::new(ms(50), ms(2)),
        RecordingRenderer::default(),
        RecordingScreen::default(),
        options(),
    );
    player.cancel_token().cancel();

    let outcome = player.run(&five_frames()).unwrap();

    assert_eq!(outcome, PlaybackOutcome::Cancelled);
    assert!(player.screen().presented.is_empty());
    assert!(!player.clock().running);
    assert_eq!(player.clock().stops, 1);
}

#[test]
fn test_cancel_mid_run_stops_audio() {
    let token = CancelToken::new();
    let mut player = PlaybackLoop::new(
        ScriptedClock::new(ms(50), ms(2)),
        RecordingRenderer::cancelling(token.clone(), 3),
        RecordingScreen::default(),
        options(),
    )
    .with_cancel_token(token);

    let outcome = player.run(&five_frames()).unwrap();

    assert_eq!(outcome, PlaybackOutcome::Cancelled);
    assert_eq!(player.screen().presented, ["0", "1", "2"]);
    assert!(!player.clock().running);
}

#[test]
fn test_loop_restarts_from_first_frame() {
    let token = CancelToken::new();
    let mut player = PlaybackLoop::new(
        ScriptedClock::new(ms(50), ms(2)),
        RecordingRenderer::cancelling(token.clone(), 7),
        RecordingScreen::default(),
        PlaybackOptions {
            loop_playback: true,
            ..options()
        },
    )
    .with_cancel_token(token);

    let outcome = player.run(&five_frames()).unwrap();

    assert_eq!(outcome, PlaybackOutcome::Cancelled);
    assert_eq!(
        player.screen().presented,
        ["0", "1", "2", "3", "4", "0", "1"]
    );
    assert_eq!(player.clock().starts, 2);
    assert_eq!(player.stats().passes, 2);
}

#[test]
fn test_early_device_stop_still_reaches_last_frame() {
    let clock = ScriptedClock::new(ms(50), ms(2)).playing_until(ms(20));
    let mut player = PlaybackLoop::new(
        clock,
        RecordingRenderer::default(),
        RecordingScreen::default(),
        options(),
    );

    let outcome = player.run(&five_frames()).unwrap();

    assert_eq!(outcome, PlaybackOutcome::Completed);
    assert_eq!(player.screen().presented.last().map(String::as_str), Some("4"));
}

#[test]
fn test_fixed_fps_longer_than_audio_completes() {
    // 5 frames at 50 fps need 100ms but the audio lasts 50ms
    let mut player = PlaybackLoop::new(
        ScriptedClock::new(ms(50), ms(2)),
        RecordingRenderer::default(),
        RecordingScreen::default(),
        PlaybackOptions {
            policy: FrameDurationPolicy::TargetFps(50),
            ..options()
        },
    );

    let outcome = player.run(&five_frames()).unwrap();

    assert_eq!(outcome, PlaybackOutcome::Completed);
    assert_eq!(player.screen().presented, ["0", "1", "2"]);
}

#[test]
fn test_clock_jumps_skip_frames() {
    // 1s of audio over 24 frames, sampled every 250ms
    let labels: Vec<String> = (0..24).map(|i| i.to_string()).collect();
    let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
    let mut player = PlaybackLoop::new(
        ScriptedClock::new(Duration::from_secs(1), ms(250)),
        RecordingRenderer::default(),
        RecordingScreen::default(),
        options(),
    );

    let outcome = player.run(&text_frames(&labels)).unwrap();

    assert_eq!(outcome, PlaybackOutcome::Completed);
    assert_eq!(player.screen().presented, ["0", "6", "12", "18", "23"]);
}

#[test]
fn test_one_second_wav_half_way_is_frame_twelve() {
    let pcm = PcmAudio::new(1, 44_100, 16, vec![0u8; 88_200]).unwrap();
    let clock = AudioClock::new(NullBackend::new(), pcm, Duration::from_secs(5));
    let total = clock.total_duration();
    assert_eq!(total, Duration::from_secs(1));

    let frame_duration = FrameDurationPolicy::EvenlyDistributed.frame_duration(total, 24);
    assert_eq!(index_for(ms(500), frame_duration, 24), 12);
    assert_eq!(index_for(total, frame_duration, 24), 23);
}

#[test]
fn test_silent_clock_runs_to_completion() {
    let clock = AudioClock::silent(NullBackend::new(), ms(60)).with_drain_grace(ms(20));
    let mut player = PlaybackLoop::new(
        clock,
        RecordingRenderer::default(),
        RecordingScreen::default(),
        options(),
    );

    let outcome = player.run(&text_frames(&["a", "b", "c"])).unwrap();

    assert_eq!(outcome, PlaybackOutcome::Completed);
    let presented = &player.screen().presented;
    assert_eq!(presented.last().map(String::as_str), Some("c"));
    assert!(presented.windows(2).all(|w| w[0] < w[1]));
    assert!(!player.clock().is_running());
}
