use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender};

use crate::compositing::domain::duration_normalizer::{DurationNormalizer, NormalizeError};
use crate::compositing::domain::playable_clip::PlayableClip;
use crate::compositing::domain::timeline_compositor::SkippedInsertion;
use crate::scheduling::domain::plan::ScheduledInsertion;

/// A scheduled insertion with its footage decoded at output resolution.
pub(crate) struct PreparedInsertion {
    pub start_sec: f64,
    pub duration: f64,
    pub clip: PlayableClip,
}

impl PreparedInsertion {
    pub fn end_sec(&self) -> f64 {
        self.start_sec + self.duration
    }
}

type Job<'a> = (usize, &'a ScheduledInsertion);
type Outcome = (usize, Result<PlayableClip, NormalizeError>);

/// Prepares insertions on a worker pool and hands them out in plan order.
///
/// At most `lookahead` clips are dispatched or decoded ahead of the consumer,
/// so memory stays bounded however long the plan is. Unusable clips are
/// skipped with a warning.
pub(crate) struct ClipFeed<'a> {
    insertions: &'a [ScheduledInsertion],
    job_tx: Sender<Job<'a>>,
    result_rx: Receiver<Outcome>,
    ready: BTreeMap<usize, Result<PlayableClip, NormalizeError>>,
    dispatched: usize,
    handed_out: usize,
    lookahead: usize,
    skipped: Vec<SkippedInsertion>,
}

impl<'a> ClipFeed<'a> {
    /// Spawns `workers` preparation threads on `scope`. They exit once the
    /// feed is dropped.
    pub fn start<'scope, 'env>(
        scope: &'scope std::thread::Scope<'scope, 'env>,
        insertions: &'a [ScheduledInsertion],
        normalizer: &'a DurationNormalizer,
        workers: usize,
    ) -> Self
    where
        'a: 'scope,
    {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<Job<'a>>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<Outcome>();
        let pool_size = workers.clamp(1, insertions.len().max(1));

        for _ in 0..pool_size {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (position, insertion) in job_rx {
                    let result = normalizer
                        .normalize(&insertion.resolved_clip, insertion.effective_duration);
                    if result_tx.send((position, result)).is_err() {
                        break;
                    }
                }
            });
        }

        Self {
            insertions,
            job_tx,
            result_rx,
            ready: BTreeMap::new(),
            dispatched: 0,
            handed_out: 0,
            lookahead: pool_size,
            skipped: Vec::new(),
        }
    }

    /// Prepares the first window of clips, checking `cancelled` before each
    /// dispatch and after each clip completes. Returns `false` if
    /// cancellation was requested; nothing further is dispatched then.
    pub fn prime(&mut self, cancelled: &AtomicBool) -> bool {
        while self.can_dispatch() {
            if cancelled.load(Ordering::Relaxed) {
                return false;
            }
            self.dispatch_one();
        }
        for position in self.handed_out..self.dispatched {
            if !self.receive_until(position) || cancelled.load(Ordering::Relaxed) {
                return false;
            }
        }
        !cancelled.load(Ordering::Relaxed)
    }

    /// The next usable insertion in plan order, blocking until it is ready.
    pub fn next(&mut self) -> Option<PreparedInsertion> {
        while self.handed_out < self.insertions.len() {
            self.refill();
            let position = self.handed_out;
            if !self.receive_until(position) {
                return None;
            }
            let result = self.ready.remove(&position)?;
            self.handed_out += 1;
            self.refill();

            let insertion = &self.insertions[position];
            match result {
                Ok(clip) => {
                    log::debug!(
                        "Prepared '{}' for {:.2}s: {:.2}s from {} frames",
                        clip.clip_id(),
                        insertion.start_sec,
                        clip.duration(),
                        clip.source_frames().len()
                    );
                    return Some(PreparedInsertion {
                        start_sec: insertion.start_sec,
                        duration: insertion.effective_duration,
                        clip,
                    });
                }
                Err(e) => self.skip(insertion.clip_id.clone(), insertion.start_sec, e.to_string()),
            }
        }
        None
    }

    /// Stops the workers and returns every skipped insertion. `unreached`
    /// and all insertions not yet handed out are reported as never shown.
    pub fn finish(mut self, unreached: Option<PreparedInsertion>) -> Vec<SkippedInsertion> {
        const NOT_REACHED: &str = "base track ended before the insertion";
        if let Some(prepared) = unreached {
            let clip_id = prepared.clip.clip_id().to_string();
            self.skip(clip_id, prepared.start_sec, NOT_REACHED.into());
        }
        for insertion in &self.insertions[self.handed_out..] {
            self.skip(insertion.clip_id.clone(), insertion.start_sec, NOT_REACHED.into());
        }
        self.skipped
    }

    fn can_dispatch(&self) -> bool {
        self.dispatched < self.insertions.len() && self.dispatched - self.handed_out < self.lookahead
    }

    fn dispatch_one(&mut self) {
        let position = self.dispatched;
        if self.job_tx.send((position, &self.insertions[position])).is_ok() {
            self.dispatched += 1;
        }
    }

    fn refill(&mut self) {
        while self.can_dispatch() {
            let before = self.dispatched;
            self.dispatch_one();
            if self.dispatched == before {
                break;
            }
        }
    }

    /// Collects worker results until `position` is ready. `false` means the
    /// workers are gone.
    fn receive_until(&mut self, position: usize) -> bool {
        while !self.ready.contains_key(&position) {
            if position >= self.dispatched {
                return false;
            }
            match self.result_rx.recv() {
                Ok((done, result)) => {
                    self.ready.insert(done, result);
                }
                Err(_) => return false,
            }
        }
        true
    }

    fn skip(&mut self, clip_id: String, start_sec: f64, reason: String) {
        log::warn!("Skipping insertion '{clip_id}' at {start_sec:.2}s: {reason}");
        self.skipped.push(SkippedInsertion {
            clip_id,
            start_sec,
            reason,
        });
    }
}
