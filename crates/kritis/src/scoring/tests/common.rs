use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::scoring::catalog::{Card, CardCatalog, RubricDefinition};
use crate::scoring::domain::{
    CardSelections, CriterionSpec, Mode, PhilosopherContext, RoundApplicability, ScaleMode,
};
use crate::scoring::router::scoring_router;
use crate::scoring::service::{ScorePayload, ScoreRequest, ScoringService};

pub(super) fn criterion(key: &str, max: u32, first: bool, later: bool) -> CriterionSpec {
    CriterionSpec {
        key: key.to_string(),
        max,
        simple: true,
        advanced: true,
        rounds: RoundApplicability { first, later },
        bonus: false,
    }
}

pub(super) fn first_round_only_rubric() -> RubricDefinition {
    RubricDefinition::new(vec![criterion("Θέση", 4, true, false)]).expect("valid rubric")
}

fn card(id: &str, keywords: &[&str]) -> Card {
    Card {
        id: id.to_string(),
        title: id.to_string(),
        keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
    }
}

pub(super) fn card_catalog() -> CardCatalog {
    CardCatalog {
        images: vec![
            card("cave", &["σπηλιά", "σκιές"]),
            card("sun", &["ήλιος", "φως"]),
        ],
        metaphors: vec![
            card("ship", &["καράβι", "κυβερνήτης"]),
            card("midwife", &["μαμή", "μαιευτική"]),
        ],
    }
}

pub(super) fn all_cards() -> CardSelections {
    CardSelections {
        images: vec!["cave".to_string(), "sun".to_string()],
        metaphors: vec!["ship".to_string(), "midwife".to_string()],
        activated: Vec::new(),
    }
}

pub(super) fn socrates() -> PhilosopherContext {
    PhilosopherContext {
        philosopher: Some("Σωκράτης".to_string()),
        position: Some("Η αρετή είναι γνώση".to_string()),
    }
}

pub(super) fn build_service() -> ScoringService {
    ScoringService::new(RubricDefinition::standard(), card_catalog(), ScaleMode::Raw)
}

pub(super) fn remote_request(round: u32, mode: Mode, judge_text: &str) -> ScoreRequest {
    ScoreRequest {
        round,
        mode,
        scale: None,
        payload: ScorePayload::Remote {
            judge_text: judge_text.to_string(),
        },
    }
}

pub(super) fn local_request(round: u32, mode: Mode, transcript: &str) -> ScoreRequest {
    ScoreRequest {
        round,
        mode,
        scale: None,
        payload: ScorePayload::Local {
            transcript: transcript.to_string(),
            cards: all_cards(),
            philosopher: socrates(),
        },
    }
}

pub(super) fn router() -> axum::Router {
    scoring_router(Arc::new(build_service()))
}

pub(super) async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}
