//! asciiplay command-line player

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use asciiplay::clock::{default_backend, fallback_duration, AudioBackend};
use asciiplay::screen::KeyListener;
use asciiplay::{
    load_wav, AudioClock, FrameSequence, NullBackend, PlaybackLoop, PlaybackOutcome, PlayerConfig,
    TerminalScreen,
};

/// Play a directory of video frames as ASCII art in sync with a WAV track
#[derive(Parser, Debug)]
#[command(name = "asciiplay", version, about)]
struct Args {
    /// Directory holding the numbered frame files
    frames_dir: PathBuf,

    /// 16-bit PCM WAV soundtrack
    #[arg(short, long, value_name = "WAV")]
    audio: Option<PathBuf>,

    /// Fixed frame rate instead of spreading frames over the audio
    #[arg(long, value_name = "N")]
    fps: Option<u32>,

    /// Restart when the audio ends
    #[arg(short = 'l', long = "loop")]
    loop_playback: bool,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Ignore the soundtrack and run against a silent clock
    #[arg(long)]
    no_audio: bool,
}

impl Args {
    fn player_config(&self) -> Result<PlayerConfig> {
        let mut config = match &self.config {
            Some(path) => PlayerConfig::from_json_file(path)?,
            None => PlayerConfig::default(),
        };
        if self.fps.is_some() {
            config.target_fps = self.fps;
        }
        if self.loop_playback {
            config.loop_playback = true;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = args.player_config()?;

    let frames = FrameSequence::from_dir(&args.frames_dir)
        .with_context(|| format!("reading frames from {}", args.frames_dir.display()))?;
    if frames.is_empty() {
        tracing::info!(dir = %args.frames_dir.display(), "no frames found");
        return Ok(());
    }

    // Without audio the clock runs for the estimated video length
    let assumed_fps = config
        .target_fps
        .map(f64::from)
        .unwrap_or(config.fallback_fps);
    let fallback = fallback_duration(frames.len(), assumed_fps);

    let audio = args.audio.as_ref().filter(|_| !args.no_audio);
    let clock: AudioClock<Box<dyn AudioBackend>> = match audio {
        Some(path) => {
            let pcm = load_wav(path).with_context(|| format!("loading {}", path.display()))?;
            tracing::info!(
                channels = pcm.channels(),
                sample_rate = pcm.sample_rate(),
                seconds = pcm.duration().as_secs_f64(),
                "audio loaded"
            );
            let backend = default_backend()
                .context("no audio output in this build, use --no-audio to play silently")?;
            AudioClock::new(backend, pcm, fallback)
        }
        None => {
            let backend: Box<dyn AudioBackend> = Box::new(NullBackend::new());
            AudioClock::silent(backend, fallback)
        }
    }
    .with_drain_grace(config.drain_grace());

    let screen = TerminalScreen::enter().context("entering terminal screen")?;
    let mut player = PlaybackLoop::new(clock, config.renderer(), screen, config.playback_options());
    let keys = KeyListener::spawn(player.cancel_token()).context("starting key listener")?;

    let outcome = player.run(&frames);

    keys.shutdown();
    let stats = player.stats();
    // Restores the terminal before anything is printed
    drop(player);

    let outcome = outcome.context("playback failed")?;
    tracing::info!(
        ?outcome,
        frames = stats.frames_rendered,
        failures = stats.render_failures,
        ticks = stats.ticks,
        passes = stats.passes,
        "playback finished"
    );
    if outcome == PlaybackOutcome::Cancelled {
        tracing::debug!("stopped by user");
    }
    Ok(())
}
