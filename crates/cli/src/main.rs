use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;

use broll_core::catalog::domain::clip_analyzer::ClipAnalyzer;
use broll_core::catalog::domain::clip_catalog::ClipCatalog;
use broll_core::catalog::infrastructure::reader_clip_analyzer::ReaderClipAnalyzer;
use broll_core::compositing::infrastructure::threaded_timeline_compositor::ThreadedTimelineCompositor;
use broll_core::matching::domain::matcher::{Matcher, NullMatcher};
use broll_core::matching::domain::transcript::Transcript;
use broll_core::matching::infrastructure::json_file_matcher::JsonFileMatcher;
use broll_core::matching::infrastructure::transcript_file_reader::read_transcript;
use broll_core::pipeline::insert_broll_use_case::InsertBrollUseCase;
use broll_core::shared::frame::FrameSize;
use broll_core::shared::policy::{Policy, ResizeMode};
use broll_core::video::domain::video_reader::{ReaderFactory, VideoReader};
use broll_core::video::domain::video_writer::{VideoWriter, WriterFactory};
use broll_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use broll_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;

/// Insert B-roll clips into a narration video.
#[derive(Parser)]
#[command(name = "broll")]
struct Cli {
    /// Base (A-roll) video file.
    base: PathBuf,

    /// B-roll clip file. Repeat for each clip; ids are broll_0, broll_1, ...
    #[arg(long = "clip", required = true)]
    clips: Vec<PathBuf>,

    /// Output video file.
    #[arg(short, long)]
    output: PathBuf,

    /// Render the composite (otherwise only the plan is printed).
    #[arg(long)]
    render: bool,

    /// Saved matcher response with candidate insertions.
    #[arg(long)]
    candidates: Option<PathBuf>,

    /// Transcript JSON (array of segments or {"segments": [...]}).
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Policy file (defaults to the per-user config file if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Longest insertion in seconds; longer candidates are clamped.
    #[arg(long)]
    max_duration: Option<f64>,

    /// Minimum seconds between consecutive insertions.
    #[arg(long)]
    min_gap: Option<f64>,

    /// Crossfade length in seconds (0 for hard cuts).
    #[arg(long)]
    crossfade: Option<f64>,

    /// How clips are fitted to the output frame: stretch or fit.
    #[arg(long)]
    resize: Option<ResizeMode>,

    /// Output width (requires --height).
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Output height (requires --width).
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Clip preparation threads.
    #[arg(long)]
    workers: Option<usize>,

    /// Output video bit rate in bits per second (defaults to the encoder's own).
    #[arg(long)]
    bit_rate: Option<usize>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let policy = build_policy(&cli)?;
    let reader_factory: ReaderFactory =
        Arc::new(|| Box::new(FfmpegReader::new()) as Box<dyn VideoReader>);
    let writer_factory = writer_factory(cli.bit_rate);

    let analyzer = ReaderClipAnalyzer::new(Arc::clone(&reader_factory));
    let catalog = ClipCatalog::from_assets(analyzer.analyze(&cli.clips))?;

    let transcript = match &cli.transcript {
        Some(path) => read_transcript(path),
        None => Transcript::default(),
    };
    let matcher: Box<dyn Matcher> = match &cli.candidates {
        Some(path) => Box::new(JsonFileMatcher::new(path)),
        None => {
            log::info!("No --candidates given; nothing will be inserted");
            Box::new(NullMatcher)
        }
    };

    let compositor = ThreadedTimelineCompositor::new(reader_factory, writer_factory, policy.clone())
        .with_progress(Box::new(|current, total| {
            if total > 0 {
                eprint!("\rRendering frame {current}/{total}");
            } else {
                eprint!("\rRendering frame {current}");
            }
        }));

    let use_case = InsertBrollUseCase::new(transcript, catalog, matcher, Box::new(compositor), policy);
    let report = use_case.run(&cli.base, &cli.output, cli.render)?;

    if let Some(rendered) = &report.rendered {
        eprintln!();
        log::info!(
            "Output written to {} ({} insertions, {} skipped)",
            rendered.path.display(),
            rendered.insertions_rendered,
            rendered.skipped.len()
        );
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn writer_factory(bit_rate: Option<usize>) -> WriterFactory {
    Arc::new(move || {
        let writer = match bit_rate {
            Some(bit_rate) => FfmpegWriter::new().with_bit_rate(bit_rate),
            None => FfmpegWriter::new(),
        };
        Box::new(writer) as Box<dyn VideoWriter>
    })
}

fn build_policy(cli: &Cli) -> Result<Policy, Box<dyn std::error::Error>> {
    let mut policy = match &cli.config {
        Some(path) => Policy::load_from(path)?,
        None => Policy::load_default()?,
    };

    if let Some(v) = cli.max_duration {
        policy.max_duration_sec = v;
    }
    if let Some(v) = cli.min_gap {
        policy.min_gap_sec = v;
    }
    if let Some(v) = cli.crossfade {
        policy.crossfade_sec = v;
    }
    if let Some(mode) = cli.resize {
        policy.resize_mode = mode;
    }
    if let (Some(width), Some(height)) = (cli.width, cli.height) {
        policy.frame_size = Some(FrameSize::new(width, height));
    }
    if cli.workers.is_some() {
        policy.workers = cli.workers;
    }

    policy.validate()?;
    Ok(policy)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.base.exists() {
        return Err(format!("Base video not found: {}", cli.base.display()).into());
    }
    check_base(&cli.base)?;

    for clip in &cli.clips {
        if !clip.exists() {
            log::warn!("Clip not found: {}", clip.display());
        }
    }
    if let Some(path) = &cli.candidates {
        if !path.exists() {
            return Err(format!("Candidates file not found: {}", path.display()).into());
        }
    }
    if cli.render && cli.output == cli.base {
        return Err("Output must not overwrite the base video".into());
    }
    Ok(())
}

fn check_base(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = FfmpegReader::new();
    let metadata = reader
        .open(path)
        .map_err(|e| format!("Base video is unreadable: {}: {e}", path.display()))?;
    reader.close();
    log::info!(
        "Base video: {}x{} @ {:.2} fps, {:.2}s",
        metadata.width,
        metadata.height,
        metadata.effective_fps(),
        metadata.estimated_duration()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["broll", "base.mp4", "--clip", "a.mp4", "-o", "out.mp4"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_bit_rate_flag() {
        assert_eq!(parse(&["--bit-rate", "2500000"]).bit_rate, Some(2_500_000));
        assert_eq!(parse(&[]).bit_rate, None);
    }

    #[test]
    fn test_width_requires_height() {
        let argv = ["broll", "base.mp4", "--clip", "a.mp4", "-o", "out.mp4", "--width", "640"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = parse(&["--config", "/nonexistent/broll.json"]);
        assert!(build_policy(&cli).is_err());
    }

    #[test]
    fn test_overrides_apply_to_policy() {
        let cli = parse(&["--crossfade", "0.25", "--workers", "3", "--width", "320", "--height", "240"]);
        let policy = build_policy(&cli).unwrap();
        assert_eq!(policy.crossfade_sec, 0.25);
        assert_eq!(policy.workers, Some(3));
        assert_eq!(policy.frame_size, Some(FrameSize::new(320, 240)));
    }
}
