//! Adaptive skill assessment engine

pub mod engine;
pub mod scoring;

pub use engine::{AssessmentEngine, PresentedQuestion, SubmitOutcome};
#[allow(unused_imports)]
pub use scoring::{AreaTally, SkillResult, aggregate_scores};

/// Questions per assessment session.
pub const TOTAL_QUESTIONS: usize = 10;
