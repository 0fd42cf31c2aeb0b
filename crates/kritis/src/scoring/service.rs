use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use super::catalog::{CardCatalog, RubricDefinition};
use super::domain::{
    CardSelections, Mode, NormalizedScoreResult, PhilosopherContext, ScaleMode, ScoringContext,
};
use super::extractor;
use super::finalizer::finalize;
use super::heuristic;
use super::prompt::{judge_messages, ChatMessage, Mission};
use super::rubric::active_criteria;

/// Which scorer produces the raw criterion values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ScorePayload {
    /// Raw text already returned by the remote judge.
    Remote { judge_text: String },
    /// The learner's own answer, scored locally.
    Local {
        transcript: String,
        #[serde(default)]
        cards: CardSelections,
        #[serde(default)]
        philosopher: PhilosopherContext,
    },
}

impl ScorePayload {
    fn label(&self) -> &'static str {
        match self {
            ScorePayload::Remote { .. } => "remote",
            ScorePayload::Local { .. } => "local",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub round: u32,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub scale: Option<ScaleMode>,
    #[serde(flatten)]
    pub payload: ScorePayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub round: u32,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub mission: Mission,
    #[serde(default)]
    pub transcript: String,
}

/// Precondition violations rejected before scoring starts.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("round must be 1 or greater")]
    InvalidRound,
    #[error("no answer to evaluate")]
    EmptyTranscript,
}

/// Facade composing the rubric, card catalog and scoring pipeline.
///
/// Configuration is read-only after construction, so one instance can serve
/// concurrent requests behind an `Arc`.
pub struct ScoringService {
    rubric: Arc<RubricDefinition>,
    catalog: Arc<CardCatalog>,
    default_scale: ScaleMode,
}

impl ScoringService {
    pub fn new(rubric: RubricDefinition, catalog: CardCatalog, default_scale: ScaleMode) -> Self {
        Self {
            rubric: Arc::new(rubric),
            catalog: Arc::new(catalog),
            default_scale,
        }
    }

    pub fn rubric(&self) -> &RubricDefinition {
        &self.rubric
    }

    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    /// Score one answer. Only precondition checks can fail.
    pub fn score(&self, request: ScoreRequest) -> Result<NormalizedScoreResult, ScoringError> {
        let context = checked_context(request.round, request.mode)?;
        let scale = request.scale.unwrap_or(self.default_scale);
        let source = request.payload.label();
        let _span = info_span!(
            "score",
            round = context.round,
            mode = context.mode.label(),
            source
        )
        .entered();

        let active = active_criteria(&self.rubric, context);
        let raw = match &request.payload {
            ScorePayload::Remote { judge_text } => {
                let extraction = extractor::extract(judge_text);
                info!(stage = extraction.stage.label(), "judge output extracted");
                extraction.scores
            }
            ScorePayload::Local {
                transcript,
                cards,
                philosopher,
            } => {
                if transcript.trim().is_empty() {
                    return Err(ScoringError::EmptyTranscript);
                }
                heuristic::score(transcript, &active, &self.catalog, cards, philosopher)
            }
        };

        let result = finalize(&raw, &active, context, scale);
        info!(total = result.total, out_of = result.out_of, "answer scored");
        Ok(result)
    }

    /// Render the remote judge's instructions for the request's round and mode.
    pub fn prompt(&self, request: &PromptRequest) -> Result<Vec<ChatMessage>, ScoringError> {
        let context = checked_context(request.round, request.mode)?;
        let active = active_criteria(&self.rubric, context);
        Ok(judge_messages(&active, &request.mission, &request.transcript))
    }
}

fn checked_context(round: u32, mode: Mode) -> Result<ScoringContext, ScoringError> {
    if round == 0 {
        return Err(ScoringError::InvalidRound);
    }
    Ok(ScoringContext::new(round, mode))
}
