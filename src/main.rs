//! Command-line front end.
//! Plays a video (or a synthetic stream) on the host timer loop, reads
//! playback commands from stdin and logs the chart value under the cursor.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossbeam::channel::{self, Sender};
use framesync::chart::Series;
use framesync::core::time;
use framesync::decode::{MemorySource, VideoSource};
use framesync::input::{parse_console_line, FrameScrubBar, RateSlider};
use framesync::playback::{MonotonicClock, PlaybackCommand, PlaybackEngine, Position, VideoPlayer};
use framesync::{PlayerConfig, PositionUnit};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PositionArg {
    Frames,
    Seconds,
}

impl From<PositionArg> for PositionUnit {
    fn from(arg: PositionArg) -> Self {
        match arg {
            PositionArg::Frames => PositionUnit::Frames,
            PositionArg::Seconds => PositionUnit::Seconds,
        }
    }
}

/// Sync a chart cursor to video playback.
///
/// Commands on stdin: space (play/pause), a / d (step back / forward),
/// seek <frame>, rate <percent>, q (quit).
#[derive(Debug, Parser)]
#[command(name = "framesync", version)]
struct Cli {
    /// Video file to play
    video: Option<PathBuf>,

    /// Play a synthetic stream of this many frames instead of a file
    #[arg(long, value_name = "FRAMES", conflicts_with = "video")]
    synthetic: Option<u64>,

    /// Frame rate of the synthetic stream
    #[arg(long, default_value_t = 24.0)]
    fps: f64,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON series of [timestamp, value] pairs to follow
    #[arg(long)]
    series: Option<PathBuf>,

    /// Initial speed in percent of normal (0-400)
    #[arg(long, value_name = "PERCENT")]
    rate: Option<u32>,

    /// Timer period in milliseconds
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,

    /// Unit of reported positions
    #[arg(long, value_enum)]
    position: Option<PositionArg>,

    /// Start paused
    #[arg(long)]
    paused: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let series = match &cli.series {
        Some(path) => Some(Series::load(path).context("loading series")?),
        None => None,
    };
    if series.is_some() && config.position == PositionUnit::Frames {
        log::warn!("Series values are looked up by time; positions are reported in frames");
    }

    let on_frame = frame_reporter(series, config.chart_window_secs);

    match (cli.synthetic, &cli.video) {
        (Some(frames), _) => {
            let player = VideoPlayer::new(MemorySource::new(frames, cli.fps), &config, on_frame)?;
            run(player, &config)
        }
        (None, Some(path)) => play_file(path, &config, on_frame),
        (None, None) => anyhow::bail!("no video given; pass a file or --synthetic <FRAMES>"),
    }
}

fn build_config(cli: &Cli) -> Result<PlayerConfig> {
    let mut config = match &cli.config {
        Some(path) => PlayerConfig::load(path).with_context(|| format!("loading {:?}", path))?,
        None => PlayerConfig::default(),
    };

    if let Some(rate) = cli.rate {
        config.rate_percent = rate;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.tick_interval_ms = tick_ms;
    }
    if let Some(position) = cli.position {
        config.position = position.into();
    }
    if cli.paused {
        config.autoplay = false;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(feature = "ffmpeg")]
fn play_file<F>(path: &Path, config: &PlayerConfig, on_frame: F) -> Result<()>
where
    F: FnMut(Position) + 'static,
{
    use framesync::decode::FfmpegSource;

    let player = VideoPlayer::open_with(|| FfmpegSource::open(path), config, on_frame)
        .with_context(|| format!("opening {:?}", path))?;
    run(player, config)
}

#[cfg(not(feature = "ffmpeg"))]
fn play_file<F>(path: &Path, _config: &PlayerConfig, _on_frame: F) -> Result<()>
where
    F: FnMut(Position) + 'static,
{
    anyhow::bail!(
        "cannot open {:?}: built without the `ffmpeg` feature (use --synthetic, or rebuild with --features ffmpeg)",
        path
    )
}

fn run<S: VideoSource>(player: VideoPlayer<S>, config: &PlayerConfig) -> Result<()> {
    let scrub_bar = FrameScrubBar::new(player.session().frame_count());
    log::info!(
        "{} frames @ {:.3} fps ({}), scrub bar 0..={}, speed {}%",
        player.session().frame_count(),
        player.session().fps(),
        time::format_time(time::from_frame_index(
            player.session().frame_count(),
            player.session().fps()
        )),
        scrub_bar.max_position(),
        RateSlider::position_for(player.session().playback_rate())
    );

    let (tx, rx) = channel::unbounded();
    spawn_console_reader(tx);

    let mut engine = PlaybackEngine::new(player, MonotonicClock::new(), config.tick_interval());
    engine.run(&rx)?;

    log::info!(
        "Stopped at frame {}",
        scrub_bar.position_for(engine.player().current_frame_index())
    );
    Ok(())
}

/// Forward stdin lines to the engine; closing stdin shuts playback down
fn spawn_console_reader(tx: Sender<PlaybackCommand>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_console_line(&line) {
                Ok(Some(command)) => {
                    let stop = command == PlaybackCommand::Stop;
                    if tx.send(command).is_err() || stop {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => log::warn!("{}", e),
            }
        }
    });
}

fn frame_reporter(series: Option<Series>, half_window: f64) -> impl FnMut(Position) + 'static {
    move |position| match position {
        Position::Frame(index) => log::info!("frame {}", index),
        Position::Seconds(seconds) => {
            let stamp = time::format_time(time::from_seconds(seconds));
            match &series {
                Some(series) => {
                    let next = series.shifted(seconds).into_iter().find(|&(x, _)| x > 0.0);
                    log::info!(
                        "{} value {:?} ({} points in view){}",
                        stamp,
                        series.value_at(seconds),
                        series.visible(seconds, half_window).len(),
                        match next {
                            Some((dx, value)) => format!(", next {} in {:.3}s", value, dx),
                            None => String::new(),
                        }
                    );
                }
                None => log::info!("{}", stamp),
            }
        }
    }
}
