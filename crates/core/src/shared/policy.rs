use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    CONFIG_DIR_NAME, DEFAULT_CROSSFADE_SEC, DEFAULT_MAX_DURATION_SEC, DEFAULT_MIN_GAP_SEC,
    POLICY_FILE_NAME,
};
use super::frame::FrameSize;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("failed to read policy file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid policy file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{field} must be {requirement}, got {value}")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },
}

/// How a B-roll frame is fitted onto the output frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Scale both axes independently to fill the output exactly.
    #[default]
    Stretch,
    /// Preserve aspect ratio and letterbox on black.
    Fit,
}

impl std::fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResizeMode::Stretch => write!(f, "stretch"),
            ResizeMode::Fit => write!(f, "fit"),
        }
    }
}

impl std::str::FromStr for ResizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stretch" => Ok(ResizeMode::Stretch),
            "fit" => Ok(ResizeMode::Fit),
            other => Err(format!("resize mode must be 'stretch' or 'fit', got '{other}'")),
        }
    }
}

/// Run-wide scheduling and compositing configuration.
///
/// Passed by value into each component; there is no global instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub max_duration_sec: f64,
    pub min_gap_sec: f64,
    pub crossfade_sec: f64,
    /// Output frame size. `None` keeps the base track's size.
    pub frame_size: Option<FrameSize>,
    pub resize_mode: ResizeMode,
    /// Clip preparation threads. `None` uses the available parallelism.
    pub workers: Option<usize>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_duration_sec: DEFAULT_MAX_DURATION_SEC,
            min_gap_sec: DEFAULT_MIN_GAP_SEC,
            crossfade_sec: DEFAULT_CROSSFADE_SEC,
            frame_size: None,
            resize_mode: ResizeMode::default(),
            workers: None,
        }
    }
}

impl Policy {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(POLICY_FILE_NAME))
    }

    pub fn load_from(path: &Path) -> Result<Self, PolicyError> {
        let json = fs::read_to_string(path).map_err(|source| PolicyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let policy: Policy = serde_json::from_str(&json).map_err(|source| PolicyError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        policy.validate()?;
        Ok(policy)
    }

    /// Loads the per-user policy file if present, otherwise the defaults.
    pub fn load_default() -> Result<Self, PolicyError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if !(self.max_duration_sec.is_finite() && self.max_duration_sec > 0.0) {
            return Err(PolicyError::OutOfRange {
                field: "max_duration_sec",
                requirement: "a positive number",
                value: self.max_duration_sec,
            });
        }
        if !(self.min_gap_sec.is_finite() && self.min_gap_sec >= 0.0) {
            return Err(PolicyError::OutOfRange {
                field: "min_gap_sec",
                requirement: "zero or positive",
                value: self.min_gap_sec,
            });
        }
        if !(self.crossfade_sec.is_finite() && self.crossfade_sec >= 0.0) {
            return Err(PolicyError::OutOfRange {
                field: "crossfade_sec",
                requirement: "zero or positive",
                value: self.crossfade_sec,
            });
        }
        if let Some(size) = self.frame_size {
            if size.is_empty() {
                return Err(PolicyError::OutOfRange {
                    field: "frame_size",
                    requirement: "non-zero in both dimensions",
                    value: 0.0,
                });
            }
        }
        if self.workers == Some(0) {
            return Err(PolicyError::OutOfRange {
                field: "workers",
                requirement: "at least 1",
                value: 0.0,
            });
        }
        Ok(())
    }

    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
