use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tempfile::TempPath;

use crate::compositing::domain::crossfade::{blend_into, opacity};
use crate::compositing::domain::duration_normalizer::DurationNormalizer;
use crate::compositing::domain::frame_resizer::FrameResizer;
use crate::compositing::domain::timeline_compositor::{
    RenderError, RenderedOutput, SkippedInsertion, TimelineCompositor,
};
use crate::compositing::infrastructure::clip_preparation::{ClipFeed, PreparedInsertion};
use crate::scheduling::domain::plan::{Plan, ScheduledInsertion};
use crate::shared::frame::{Frame, FrameSize};
use crate::shared::policy::Policy;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::{ReaderFactory, VideoReader};
use crate::video::domain::video_writer::{VideoWriter, WriterFactory};

const DEFAULT_CHANNEL_CAPACITY: usize = 8;

type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Called with `(frames_written, total_frames)`; `total_frames` is 0 when
/// the base track does not report a frame count.
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Renders the composite with dedicated threads for decode and encode.
///
/// Layout: `workers [normalize/resize clips] → reader → main [blend] → writer`
///
/// Clips are prepared a few insertions ahead of the base track and dropped
/// once their fade-out has passed. Cancellation is honoured until the first
/// window of clips is ready; after that the encode runs to completion. The
/// encode goes to a temporary file beside `output` that is renamed into
/// place on success.
pub struct ThreadedTimelineCompositor {
    reader_factory: ReaderFactory,
    writer_factory: WriterFactory,
    policy: Policy,
    channel_capacity: usize,
    cancelled: Arc<AtomicBool>,
    on_progress: Option<ProgressCallback>,
}

struct Encoded {
    frames_written: usize,
    insertions_rendered: usize,
    unreached: Option<PreparedInsertion>,
}

impl ThreadedTimelineCompositor {
    pub fn new(reader_factory: ReaderFactory, writer_factory: WriterFactory, policy: Policy) -> Self {
        Self {
            reader_factory,
            writer_factory,
            policy,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            cancelled: Arc::new(AtomicBool::new(false)),
            on_progress: None,
        }
    }

    pub fn with_cancellation(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    fn encode(
        &self,
        reader: Box<dyn VideoReader>,
        feed: &mut ClipFeed<'_>,
        metadata: &VideoMetadata,
        path: &Path,
    ) -> Result<Encoded, RenderError> {
        let mut writer = (self.writer_factory)();
        writer
            .open(path, metadata)
            .map_err(|e| RenderError::EncodeFailure(e.to_string()))?;

        let cap = self.channel_capacity;
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Result<Frame, SendError>>(cap);
        let (write_tx, write_rx) = crossbeam_channel::bounded::<Frame>(cap);

        let reader_handle = spawn_reader(reader, frame_tx);
        let writer_handle = spawn_writer(writer, write_rx);

        let blend = BlendSettings {
            fps: metadata.effective_fps(),
            target: metadata.frame_size(),
            resizer: FrameResizer::new(self.policy.resize_mode),
        };
        let mut timeline = Timeline::new(feed, self.policy.crossfade_sec);
        let (frames_written, main_error) = run_main_loop(
            frame_rx,
            &write_tx,
            &mut timeline,
            &blend,
            metadata.total_frames,
            self.on_progress.as_deref(),
        );

        drop(write_tx);

        join_threads(reader_handle, writer_handle, main_error)?;
        Ok(Encoded {
            frames_written,
            insertions_rendered: timeline.activated,
            unreached: timeline.upcoming.take(),
        })
    }
}

impl TimelineCompositor for ThreadedTimelineCompositor {
    fn render(&self, base_track: &Path, plan: &Plan, output: &Path) -> Result<RenderedOutput, RenderError> {
        let unreadable = |reason: String| RenderError::BaseTrackUnreadable {
            path: base_track.to_path_buf(),
            reason,
        };

        let mut reader = (self.reader_factory)();
        let base = reader.open(base_track).map_err(|e| unreadable(e.to_string()))?;
        let target = self.policy.frame_size.unwrap_or_else(|| base.frame_size());
        if target.is_empty() {
            reader.close();
            return Err(unreadable("base track has no frame size".into()));
        }

        let (reachable, mut skipped) = split_at_base_end(plan, base.estimated_duration());
        let normalizer = DurationNormalizer::new(Arc::clone(&self.reader_factory))
            .with_output(FrameResizer::new(self.policy.resize_mode), target);

        log::info!(
            "Compositing {} of {} insertions onto {} ({}x{} @ {:.2} fps)",
            reachable.len(),
            plan.len(),
            base_track.display(),
            target.width,
            target.height,
            base.effective_fps()
        );

        let metadata = VideoMetadata {
            width: target.width,
            height: target.height,
            fps: base.effective_fps(),
            source_path: Some(base_track.to_path_buf()),
            ..base
        };

        let (temp, encoded, feed_skipped) = std::thread::scope(|scope| {
            let mut feed =
                ClipFeed::start(scope, reachable, &normalizer, self.policy.worker_count());
            if !feed.prime(&self.cancelled) {
                reader.close();
                log::info!("Render cancelled before encoding");
                return Err(RenderError::Cancelled);
            }

            let temp = temp_output_path(output)?;
            let mut encoded = self.encode(reader, &mut feed, &metadata, &temp)?;
            let feed_skipped = feed.finish(encoded.unreached.take());
            Ok((temp, encoded, feed_skipped))
        })?;

        temp.persist(output).map_err(|e| RenderError::Io {
            path: output.to_path_buf(),
            source: e.error,
        })?;

        skipped.extend(feed_skipped);
        skipped.sort_by(|a, b| a.start_sec.total_cmp(&b.start_sec));
        Ok(RenderedOutput {
            path: output.to_path_buf(),
            frames_written: encoded.frames_written,
            insertions_rendered: encoded.insertions_rendered,
            skipped,
        })
    }
}

/// Splits off insertions starting at or after `base_end`; they are reported
/// as skipped without decoding their clips. A zero `base_end` means the
/// length is unknown and every insertion is kept.
fn split_at_base_end(plan: &Plan, base_end: f64) -> (&[ScheduledInsertion], Vec<SkippedInsertion>) {
    let insertions = plan.insertions();
    if base_end <= 0.0 {
        return (insertions, Vec::new());
    }
    let cut = insertions.partition_point(|insertion| insertion.start_sec < base_end);
    let (reachable, late) = insertions.split_at(cut);
    let skipped = late
        .iter()
        .map(|insertion| {
            let reason = format!("starts after the base track ends ({base_end:.2}s)");
            log::warn!(
                "Skipping insertion '{}' at {:.2}s: {reason}",
                insertion.clip_id,
                insertion.start_sec
            );
            SkippedInsertion {
                clip_id: insertion.clip_id.clone(),
                start_sec: insertion.start_sec,
                reason,
            }
        })
        .collect();
    (reachable, skipped)
}

/// Reserves a temporary file in `output`'s directory with the same extension,
/// so the container format is inferred identically and the final rename
/// stays on one filesystem.
fn temp_output_path(output: &Path) -> Result<TempPath, RenderError> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let suffix = output
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    tempfile::Builder::new()
        .prefix(".broll-")
        .suffix(&suffix)
        .tempfile_in(&dir)
        .map(|file| file.into_temp_path())
        .map_err(|source| RenderError::Io { path: dir, source })
}

/// Insertions on screen at the current base time. Upcoming clips are pulled
/// from the feed as their fade-in begins and released after their fade-out.
struct Timeline<'f, 'a> {
    feed: &'f mut ClipFeed<'a>,
    upcoming: Option<PreparedInsertion>,
    active: VecDeque<PreparedInsertion>,
    fade: f64,
    activated: usize,
}

impl<'f, 'a> Timeline<'f, 'a> {
    fn new(feed: &'f mut ClipFeed<'a>, fade: f64) -> Self {
        let upcoming = feed.next();
        Self {
            feed,
            upcoming,
            active: VecDeque::new(),
            fade,
            activated: 0,
        }
    }

    fn advance(&mut self, t: f64) {
        let fade = self.fade;
        while self
            .upcoming
            .as_ref()
            .is_some_and(|next| t >= next.start_sec - fade)
        {
            if let Some(next) = self.upcoming.take() {
                log::debug!("Overlaying '{}' at {:.2}s", next.clip.clip_id(), next.start_sec);
                self.active.push_back(next);
                self.activated += 1;
            }
            self.upcoming = self.feed.next();
        }
        // Plans never overlap, so the earliest clip is always the first to end.
        while self
            .active
            .front()
            .is_some_and(|clip| t >= clip.end_sec() + fade)
        {
            self.active.pop_front();
        }
    }
}

struct BlendSettings {
    fps: f64,
    target: FrameSize,
    resizer: FrameResizer,
}

impl BlendSettings {
    fn composite(&self, frame: Frame, timeline: &mut Timeline<'_, '_>) -> Frame {
        let mut frame = if frame.size() == self.target {
            frame
        } else {
            self.resizer.resize(&frame, self.target)
        };

        let t = frame.index() as f64 / self.fps;
        timeline.advance(t);
        for insertion in &timeline.active {
            let alpha = opacity(t, insertion.start_sec, insertion.duration, timeline.fade);
            if alpha <= 0.0 {
                continue;
            }
            let local = (t - insertion.start_sec).clamp(0.0, insertion.duration);
            blend_into(&mut frame, insertion.clip.frame_at(local), alpha);
        }
        frame
    }
}

fn spawn_reader(
    mut reader: Box<dyn VideoReader>,
    frame_tx: crossbeam_channel::Sender<Result<Frame, SendError>>,
) -> std::thread::JoinHandle<Box<dyn VideoReader>> {
    std::thread::spawn(move || {
        for frame_result in reader.frames() {
            let mapped = frame_result.map_err(|e| -> SendError { e.to_string().into() });
            if frame_tx.send(mapped).is_err() {
                break;
            }
        }
        reader.close();
        reader
    })
}

fn spawn_writer(
    mut writer: Box<dyn VideoWriter>,
    write_rx: crossbeam_channel::Receiver<Frame>,
) -> std::thread::JoinHandle<Result<Box<dyn VideoWriter>, SendError>> {
    std::thread::spawn(move || {
        for frame in write_rx {
            writer
                .write(&frame)
                .map_err(|e| -> SendError { e.to_string().into() })?;
        }
        Ok(writer)
    })
}

/// Blends each base frame with the insertions covering it and forwards it to
/// the writer. Returns the number of frames handed to the writer.
fn run_main_loop(
    frame_rx: crossbeam_channel::Receiver<Result<Frame, SendError>>,
    write_tx: &crossbeam_channel::Sender<Frame>,
    timeline: &mut Timeline<'_, '_>,
    blend: &BlendSettings,
    total_frames: usize,
    on_progress: Option<&(dyn Fn(usize, usize) + Send + Sync)>,
) -> (usize, Option<RenderError>) {
    let mut frames_written = 0;

    for frame_result in frame_rx {
        let frame = match frame_result {
            Ok(frame) => frame,
            Err(e) => {
                let error = RenderError::EncodeFailure(format!(
                    "base track decode failed after {frames_written} frames: {e}"
                ));
                return (frames_written, Some(error));
            }
        };

        let composite = blend.composite(frame, timeline);
        // A closed channel means the writer failed; its error is reported on join.
        if write_tx.send(composite).is_err() {
            break;
        }
        frames_written += 1;

        if let Some(cb) = on_progress {
            cb(frames_written, total_frames);
        }
    }

    (frames_written, None)
}

/// Joins both I/O threads and coalesces the first error encountered.
fn join_threads(
    reader_handle: std::thread::JoinHandle<Box<dyn VideoReader>>,
    writer_handle: std::thread::JoinHandle<Result<Box<dyn VideoWriter>, SendError>>,
    mut first_error: Option<RenderError>,
) -> Result<(), RenderError> {
    fn set_if_none(slot: &mut Option<RenderError>, message: String) {
        if slot.is_none() {
            *slot = Some(RenderError::EncodeFailure(message));
        }
    }

    if reader_handle.join().is_err() {
        set_if_none(&mut first_error, "reader thread panicked".into());
    }

    match writer_handle.join() {
        Ok(Ok(mut w)) => {
            if let Err(e) = w.close() {
                set_if_none(&mut first_error, e.to_string());
            }
        }
        Ok(Err(e)) => set_if_none(&mut first_error, e.to_string()),
        Err(_) => set_if_none(&mut first_error, "writer thread panicked".into()),
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
