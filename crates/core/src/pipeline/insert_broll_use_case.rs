use std::path::Path;

use serde::Serialize;

use crate::catalog::domain::clip_catalog::ClipCatalog;
use crate::compositing::domain::timeline_compositor::{
    RenderError, RenderedOutput, TimelineCompositor,
};
use crate::matching::domain::matcher::Matcher;
use crate::matching::domain::transcript::Transcript;
use crate::scheduling::domain::plan::Plan;
use crate::scheduling::domain::planner::plan_insertions;
use crate::scheduling::domain::rejection::Rejection;
use crate::shared::constants::SHORT_TRANSCRIPT_CHARS;
use crate::shared::policy::Policy;

/// What a run decided and, when rendering, what it produced.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub transcript_chars: usize,
    pub clip_count: usize,
    pub candidate_count: usize,
    pub plan: Plan,
    pub rejections: Vec<Rejection>,
    /// `None` when rendering was not requested.
    pub rendered: Option<RenderedOutput>,
}

/// Orchestrates one B-roll run: propose, validate, schedule, then render.
///
/// Scheduling never fails; only the render step can abort the run.
pub struct InsertBrollUseCase {
    transcript: Transcript,
    catalog: ClipCatalog,
    matcher: Box<dyn Matcher>,
    compositor: Box<dyn TimelineCompositor>,
    policy: Policy,
}

impl InsertBrollUseCase {
    pub fn new(
        transcript: Transcript,
        catalog: ClipCatalog,
        matcher: Box<dyn Matcher>,
        compositor: Box<dyn TimelineCompositor>,
        policy: Policy,
    ) -> Self {
        Self {
            transcript,
            catalog,
            matcher,
            compositor,
            policy,
        }
    }

    pub fn run(&self, base_track: &Path, output: &Path, render: bool) -> Result<RunReport, RenderError> {
        let formatted = self.transcript.formatted();
        let transcript_chars = formatted.chars().count();
        log::info!("Transcript: {transcript_chars} characters");
        if transcript_chars < SHORT_TRANSCRIPT_CHARS {
            log::warn!("Transcript is very short ({transcript_chars} characters); matching may be poor");
        }
        log::info!("Catalog: {} clips", self.catalog.len());

        let candidates = match self.matcher.propose(&self.transcript, &self.catalog) {
            Ok(candidates) => candidates,
            Err(e) => {
                log::warn!("Matcher failed, continuing without candidates: {e}");
                Vec::new()
            }
        };
        log::info!("Matcher proposed {} candidates", candidates.len());

        let outcome = plan_insertions(&candidates, &self.catalog, &self.policy);
        if outcome.plan.is_empty() {
            log::info!("Plan has 0 insertions");
        } else {
            log::info!(
                "Accepted {} of {} candidates",
                outcome.plan.len(),
                candidates.len()
            );
        }

        let rendered = if render {
            Some(self.compositor.render(base_track, &outcome.plan, output)?)
        } else {
            None
        };

        Ok(RunReport {
            transcript_chars,
            clip_count: self.catalog.len(),
            candidate_count: candidates.len(),
            plan: outcome.plan,
            rejections: outcome.rejections,
            rendered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::clip_asset::ClipAsset;
    use crate::matching::domain::candidate_insertion::CandidateInsertion;
    use crate::matching::domain::matcher::NullMatcher;
    use crate::scheduling::domain::rejection::RejectionReason;
    use crate::shared::frame::FrameSize;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct StubMatcher {
        result: Result<Vec<CandidateInsertion>, String>,
    }

    impl Matcher for StubMatcher {
        fn propose(
            &self,
            _transcript: &Transcript,
            _catalog: &ClipCatalog,
        ) -> Result<Vec<CandidateInsertion>, Box<dyn std::error::Error>> {
            self.result.clone().map_err(Into::into)
        }
    }

    #[derive(Default)]
    struct StubCompositor {
        rendered_plans: Arc<Mutex<Vec<Plan>>>,
        fail: bool,
    }

    impl TimelineCompositor for StubCompositor {
        fn render(
            &self,
            _base_track: &Path,
            plan: &Plan,
            output: &Path,
        ) -> Result<RenderedOutput, RenderError> {
            if self.fail {
                return Err(RenderError::EncodeFailure("stub".into()));
            }
            self.rendered_plans.lock().unwrap().push(plan.clone());
            Ok(RenderedOutput {
                path: output.to_path_buf(),
                frames_written: 0,
                insertions_rendered: plan.len(),
                skipped: Vec::new(),
            })
        }
    }

    fn catalog() -> ClipCatalog {
        let asset = |id: &str| ClipAsset {
            id: id.into(),
            source_path: PathBuf::from(format!("/clips/{id}.mp4")),
            known_duration: 10.0,
            frame_size: FrameSize::new(640, 360),
            description: String::new(),
        };
        ClipCatalog::from_assets(vec![asset("broll_0"), asset("broll_1")]).unwrap()
    }

    fn use_case(matcher: Box<dyn Matcher>, compositor: StubCompositor) -> InsertBrollUseCase {
        InsertBrollUseCase::new(
            Transcript::default(),
            catalog(),
            matcher,
            Box::new(compositor),
            Policy::default(),
        )
    }

    fn candidates() -> Vec<CandidateInsertion> {
        vec![
            CandidateInsertion::new(10.0, 3.0, "broll_1"),
            CandidateInsertion::new(1.0, 3.0, "broll_0"),
            CandidateInsertion::new(4.5, 3.0, "broll_1"),
            CandidateInsertion::new(20.0, 3.0, "ghost"),
        ]
    }

    #[test]
    fn test_plans_without_rendering() {
        let compositor = StubCompositor::default();
        let rendered_plans = Arc::clone(&compositor.rendered_plans);
        let matcher = Box::new(StubMatcher {
            result: Ok(candidates()),
        });

        let report = use_case(matcher, compositor)
            .run(Path::new("/base.mp4"), Path::new("/out.mp4"), false)
            .unwrap();

        assert_eq!(report.candidate_count, 4);
        assert_eq!(report.clip_count, 2);
        let starts: Vec<f64> = report.plan.insertions().iter().map(|i| i.start_sec).collect();
        assert_eq!(starts, vec![1.0, 10.0]);
        assert_eq!(report.rejections.len(), 2);
        assert!(report.rendered.is_none());
        assert!(rendered_plans.lock().unwrap().is_empty());
    }

    #[test]
    fn test_rejections_carry_reasons() {
        let matcher = Box::new(StubMatcher {
            result: Ok(candidates()),
        });
        let report = use_case(matcher, StubCompositor::default())
            .run(Path::new("/base.mp4"), Path::new("/out.mp4"), false)
            .unwrap();

        assert!(matches!(
            report.rejections[0].reason,
            RejectionReason::Conflict { .. }
        ));
        assert_eq!(report.rejections[0].index, 2);
        assert!(matches!(
            report.rejections[1].reason,
            RejectionReason::UnknownClip { .. }
        ));
    }

    #[test]
    fn test_render_receives_the_plan() {
        let compositor = StubCompositor::default();
        let rendered_plans = Arc::clone(&compositor.rendered_plans);
        let matcher = Box::new(StubMatcher {
            result: Ok(candidates()),
        });

        let report = use_case(matcher, compositor)
            .run(Path::new("/base.mp4"), Path::new("/out.mp4"), true)
            .unwrap();

        let rendered = report.rendered.unwrap();
        assert_eq!(rendered.path, PathBuf::from("/out.mp4"));
        assert_eq!(rendered.insertions_rendered, 2);
        assert_eq!(rendered_plans.lock().unwrap()[0], report.plan);
    }

    #[test]
    fn test_empty_plan_still_renders_base() {
        let compositor = StubCompositor::default();
        let rendered_plans = Arc::clone(&compositor.rendered_plans);

        let report = use_case(Box::new(NullMatcher), compositor)
            .run(Path::new("/base.mp4"), Path::new("/out.mp4"), true)
            .unwrap();

        assert!(report.plan.is_empty());
        assert!(report.rejections.is_empty());
        assert!(report.rendered.is_some());
        assert!(rendered_plans.lock().unwrap()[0].is_empty());
    }

    #[test]
    fn test_matcher_failure_means_no_candidates() {
        let matcher = Box::new(StubMatcher {
            result: Err("service unavailable".into()),
        });
        let report = use_case(matcher, StubCompositor::default())
            .run(Path::new("/base.mp4"), Path::new("/out.mp4"), false)
            .unwrap();

        assert_eq!(report.candidate_count, 0);
        assert!(report.plan.is_empty());
    }

    #[test]
    fn test_render_failure_is_surfaced() {
        let matcher = Box::new(StubMatcher {
            result: Ok(candidates()),
        });
        let compositor = StubCompositor {
            fail: true,
            ..StubCompositor::default()
        };
        let result = use_case(matcher, compositor).run(Path::new("/base.mp4"), Path::new("/out.mp4"), true);
        assert!(matches!(result, Err(RenderError::EncodeFailure(_))));
    }

    #[test]
    fn test_report_serializes() {
        let matcher = Box::new(StubMatcher {
            result: Ok(candidates()),
        });
        let report = use_case(matcher, StubCompositor::default())
            .run(Path::new("/base.mp4"), Path::new("/out.mp4"), false)
            .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["plan"]["insertions"].as_array().unwrap().len(), 2);
        assert_eq!(json["rejections"][1]["reason"]["kind"], "unknown_clip");
        assert!(json["rendered"].is_null());
    }
}
