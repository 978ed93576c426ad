/// Longest B-roll insertion the engine will schedule, in seconds.
pub const DEFAULT_MAX_DURATION_SEC: f64 = 5.0;

/// Minimum silence between the end of one insertion and the start of the next.
pub const DEFAULT_MIN_GAP_SEC: f64 = 2.0;

pub const DEFAULT_CROSSFADE_SEC: f64 = 0.2;

/// Frame rate assumed when a stream reports none.
pub const FALLBACK_FPS: f64 = 30.0;

/// Largest time base denominator the MPEG-4 encoder accepts.
pub const MAX_TIME_BASE_DENOMINATOR: i32 = 65535;

/// ffmpeg's internal time base (microseconds).
pub const AV_TIME_BASE: f64 = 1_000_000.0;

pub const CLIP_ID_PREFIX: &str = "broll_";

/// Formatted transcripts shorter than this are likely a failed transcription.
pub const SHORT_TRANSCRIPT_CHARS: usize = 100;

pub const CONFIG_DIR_NAME: &str = "broll-inserter";
pub const POLICY_FILE_NAME: &str = "policy.json";
