use kritis::config::ScoringConfig;
use kritis::error::AppError;
use kritis::scoring::{CardCatalog, RubricDefinition, ScoringService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Build the scoring service from configured rubric and card files, falling
/// back to the built-in rubric and an empty card catalog.
pub(crate) fn load_scoring_service(config: &ScoringConfig) -> Result<ScoringService, AppError> {
    let rubric = match &config.rubric_path {
        Some(path) => {
            let rubric = RubricDefinition::from_path(path)?;
            info!(path = %path.display(), criteria = rubric.len(), "rubric loaded");
            rubric
        }
        None => RubricDefinition::standard(),
    };

    let catalog = match &config.cards_path {
        Some(path) => {
            let catalog = CardCatalog::from_path(path)?;
            info!(
                path = %path.display(),
                images = catalog.images.len(),
                metaphors = catalog.metaphors.len(),
                "card catalog loaded"
            );
            catalog
        }
        None => CardCatalog::default(),
    };

    Ok(ScoringService::new(rubric, catalog, config.scale))
}
