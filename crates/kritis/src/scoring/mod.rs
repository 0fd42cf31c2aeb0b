//! Scoring-normalization pipeline for argumentative answers.
//!
//! A request flows through [`active_criteria`] to pick the criteria scored
//! this round, then through either the remote judge [`extractor`] or the
//! local [`heuristic`] scorer, and finally through [`finalize`], which is the
//! only producer of [`NormalizedScoreResult`].

pub mod catalog;
pub mod domain;
pub mod extractor;
pub mod finalizer;
pub mod heuristic;
pub mod normalizer;
pub mod prompt;
pub mod router;
pub mod rubric;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{Card, CardCatalog, CatalogError, ResolvedCards, RubricDefinition};
pub use domain::{
    CardSelections, CriterionSpec, Mode, NormalizedScoreResult, PhilosopherContext,
    RawCriterionScores, RoundApplicability, ScaleMode, ScoringContext, BONUS_KEY,
};
pub use extractor::{extract, extract_scores, Extraction, RecoveryStage};
pub use finalizer::finalize;
pub use prompt::{judge_messages, ChatMessage, ChatRole, Mission};
pub use router::scoring_router;
pub use rubric::{active_criteria, ActiveCriteriaSet};
pub use service::{PromptRequest, ScorePayload, ScoreRequest, ScoringError, ScoringService};
