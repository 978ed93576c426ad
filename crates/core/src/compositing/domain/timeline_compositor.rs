use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::scheduling::domain::plan::Plan;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("base track {path} is unreadable: {reason}")]
    BaseTrackUnreadable { path: PathBuf, reason: String },
    #[error("encoding failed: {0}")]
    EncodeFailure(String),
    #[error("render cancelled before encoding")]
    Cancelled,
    #[error("failed to finalize {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A planned insertion the compositor could not render.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkippedInsertion {
    pub clip_id: String,
    pub start_sec: f64,
    pub reason: String,
}

/// Summary of a completed render.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedOutput {
    pub path: PathBuf,
    pub frames_written: usize,
    pub insertions_rendered: usize,
    pub skipped: Vec<SkippedInsertion>,
}

/// Renders a base track with a plan's insertions overlaid.
///
/// The base track's length and audio are preserved. Insertions starting at
/// or after the end of the base track are reported as skipped. On failure
/// nothing new is written at `output`; a previous file there is left
/// untouched.
pub trait TimelineCompositor {
    fn render(&self, base_track: &Path, plan: &Plan, output: &Path) -> Result<RenderedOutput, RenderError>;
}
