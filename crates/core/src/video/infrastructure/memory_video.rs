//! In-memory readers and writers for exercising the pipeline without ffmpeg.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::shared::frame::{Frame, FrameSize};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::{ReaderFactory, VideoReader};
use crate::video::domain::video_writer::{VideoWriter, WriterFactory};

pub(crate) struct MemorySource {
    pub meta: VideoMetadata,
    pub frames: Vec<Frame>,
}

/// `count` frames of one colour at `fps`.
pub(crate) fn solid_source(size: FrameSize, fps: f64, count: usize, rgb: [u8; 3]) -> MemorySource {
    MemorySource {
        meta: VideoMetadata {
            width: size.width,
            height: size.height,
            fps,
            frame_rate: None,
            total_frames: count,
            duration_sec: count as f64 / fps,
            codec: "raw".into(),
            source_path: None,
        },
        frames: (0..count).map(|i| Frame::solid(size, rgb, i)).collect(),
    }
}

#[derive(Default)]
pub(crate) struct MemoryLibrary {
    sources: HashMap<PathBuf, MemorySource>,
}

impl MemoryLibrary {
    pub fn with(mut self, path: &str, source: MemorySource) -> Self {
        self.sources.insert(PathBuf::from(path), source);
        self
    }

    pub fn into_factory(self) -> ReaderFactory {
        let library = Arc::new(self);
        Arc::new(move || {
            Box::new(MemoryReader {
                library: Arc::clone(&library),
                current: None,
            }) as Box<dyn VideoReader>
        })
    }
}

struct MemoryReader {
    library: Arc<MemoryLibrary>,
    current: Option<PathBuf>,
}

impl VideoReader for MemoryReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        let source = self
            .library
            .sources
            .get(path)
            .ok_or_else(|| format!("no such video: {}", path.display()))?;
        self.current = Some(path.to_path_buf());
        Ok(VideoMetadata {
            source_path: Some(path.to_path_buf()),
            ..source.meta.clone()
        })
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let source = self
            .current
            .as_ref()
            .and_then(|path| self.library.sources.get(path));
        match source {
            Some(source) => Box::new(source.frames.iter().cloned().map(Ok::<_, Box<dyn std::error::Error>>)),
            None => Box::new(std::iter::once(Err::<Frame, Box<dyn std::error::Error>>(
                "reader not opened".into(),
            ))),
        }
    }

    fn close(&mut self) {
        self.current = None;
    }
}

#[derive(Default)]
pub(crate) struct WriterLog {
    pub opened: Option<(PathBuf, VideoMetadata)>,
    pub frames: Vec<Frame>,
    pub closed: bool,
}

/// Records everything written; optionally fails on the `fail_at`-th frame.
pub(crate) fn recording_writer(fail_at: Option<usize>) -> (WriterFactory, Arc<Mutex<WriterLog>>) {
    let log = Arc::new(Mutex::new(WriterLog::default()));
    let shared = Arc::clone(&log);
    let factory: WriterFactory = Arc::new(move || {
        Box::new(RecordingWriter {
            log: Arc::clone(&shared),
            fail_at,
        }) as Box<dyn VideoWriter>
    });
    (factory, log)
}

struct RecordingWriter {
    log: Arc<Mutex<WriterLog>>,
    fail_at: Option<usize>,
}

impl VideoWriter for RecordingWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.log.lock().unwrap().opened = Some((path.to_path_buf(), metadata.clone()));
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let mut log = self.log.lock().unwrap();
        if self.fail_at == Some(log.frames.len()) {
            return Err("disk full".into());
        }
        log.frames.push(frame.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}

pub(crate) type OpenHook = Arc<dyn Fn(&Path) + Send + Sync>;

/// Wraps `inner` so that `on_open` sees every path before it is opened.
pub(crate) fn observed(inner: ReaderFactory, on_open: OpenHook) -> ReaderFactory {
    Arc::new(move || {
        Box::new(ObservedReader {
            inner: inner(),
            on_open: Arc::clone(&on_open),
        }) as Box<dyn VideoReader>
    })
}

struct ObservedReader {
    inner: Box<dyn VideoReader>,
    on_open: OpenHook,
}

impl VideoReader for ObservedReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        (self.on_open)(path);
        self.inner.open(path)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        self.inner.frames()
    }

    fn close(&mut self) {
        self.inner.close();
    }
}
