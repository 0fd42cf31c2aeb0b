use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved criteria-map slot carrying the shared bonus point.
pub const BONUS_KEY: &str = "bonus";

/// Difficulty mode selected for the dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Simple,
    Advanced,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Simple => "simple",
            Mode::Advanced => "advanced",
        }
    }
}

/// Round and mode of a single scoring request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringContext {
    pub round: u32,
    pub mode: Mode,
}

impl ScoringContext {
    pub fn new(round: u32, mode: Mode) -> Self {
        Self { round, mode }
    }

    /// Rounds below two count as the opening round.
    pub fn is_first_round(&self) -> bool {
        self.round <= 1
    }
}

/// Round applicability flags as they appear in rubric configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundApplicability {
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub later: bool,
}

/// One bounded rubric criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionSpec {
    pub key: String,
    pub max: u32,
    #[serde(default)]
    pub simple: bool,
    #[serde(default)]
    pub advanced: bool,
    #[serde(default)]
    pub rounds: RoundApplicability,
    #[serde(default)]
    pub bonus: bool,
}

impl CriterionSpec {
    pub fn applies_in_mode(&self, mode: Mode) -> bool {
        match mode {
            Mode::Simple => self.simple,
            Mode::Advanced => self.advanced,
        }
    }

    pub fn applies_in_round(&self, context: &ScoringContext) -> bool {
        if context.is_first_round() {
            self.rounds.first
        } else {
            self.rounds.later
        }
    }

    pub fn applies_to(&self, context: &ScoringContext) -> bool {
        self.applies_in_mode(context.mode) && self.applies_in_round(context)
    }
}

/// Card ids the player held during the round.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardSelections {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub metaphors: Vec<String>,
    #[serde(default)]
    pub activated: Vec<String>,
}

/// The philosopher and stance the player was assigned.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhilosopherContext {
    #[serde(default)]
    pub philosopher: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

/// Untrusted per-criterion values and feedback, as produced by either scorer.
///
/// Values stay as raw JSON until [`finalize`](super::finalize) coerces them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawCriterionScores {
    #[serde(default)]
    pub criteria: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Value>,
    #[serde(
        default,
        rename = "total",
        skip_serializing_if = "Option::is_none"
    )]
    pub reported_total: Option<Value>,
}

impl RawCriterionScores {
    pub fn with_feedback(feedback: impl Into<String>) -> Self {
        Self {
            feedback: Some(Value::String(feedback.into())),
            ..Self::default()
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.criteria.insert(key.into(), value.into());
    }

    pub fn feedback_text(&self) -> Option<&str> {
        self.feedback.as_ref().and_then(Value::as_str)
    }
}

/// Display scale requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    Raw,
    #[default]
    TenPoint,
}

/// Trusted score returned to external collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedScoreResult {
    pub criteria: IndexMap<String, u32>,
    pub total: u32,
    pub out_of: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaled: Option<u32>,
    pub feedback: String,
}
