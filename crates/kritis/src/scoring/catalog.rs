use super::domain::{CardSelections, CriterionSpec, RoundApplicability, BONUS_KEY};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Ordered, key-unique list of rubric criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RubricDefinition {
    criteria: Vec<CriterionSpec>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RubricFile {
    Wrapped { criteria: Vec<CriterionSpec> },
    Bare(Vec<CriterionSpec>),
}

impl RubricDefinition {
    pub fn new(criteria: Vec<CriterionSpec>) -> Result<Self, CatalogError> {
        validate(&criteria)?;
        Ok(Self { criteria })
    }

    /// The five-criterion rubric used by the dialogue game.
    pub fn standard() -> Self {
        let spec = |key: &str, max: u32, simple: bool, first: bool, later: bool, bonus: bool| {
            CriterionSpec {
                key: key.to_string(),
                max,
                simple,
                advanced: true,
                rounds: RoundApplicability { first, later },
                bonus,
            }
        };

        Self {
            criteria: vec![
                spec("Θέση", 4, true, true, false, false),
                spec("Επιχειρηματολογία", 6, true, true, true, false),
                spec("Εικόνα/Μεταφορά", 3, false, true, true, true),
                spec("Παράδειγμα", 3, true, true, true, false),
                spec("Αντίρρηση", 4, true, false, true, false),
            ],
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let criteria = match serde_json::from_str::<RubricFile>(raw)? {
            RubricFile::Wrapped { criteria } | RubricFile::Bare(criteria) => criteria,
        };
        Self::new(criteria)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn criteria(&self) -> &[CriterionSpec] {
        &self.criteria
    }

    pub fn get(&self, key: &str) -> Option<&CriterionSpec> {
        self.criteria.iter().find(|criterion| criterion.key == key)
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

fn validate(criteria: &[CriterionSpec]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    let mut bonus_holder: Option<&str> = None;

    for criterion in criteria {
        let key = criterion.key.trim();
        if key.is_empty() {
            return Err(CatalogError::EmptyKey);
        }
        if key == BONUS_KEY {
            return Err(CatalogError::ReservedKey(key.to_string()));
        }
        if !seen.insert(key) {
            return Err(CatalogError::DuplicateKey(key.to_string()));
        }
        if criterion.bonus {
            if let Some(first) = bonus_holder {
                return Err(CatalogError::MultipleBonus {
                    first: first.to_string(),
                    second: key.to_string(),
                });
            }
            bonus_holder = Some(key);
        }
    }

    Ok(())
}

/// A single image or metaphor card with its matching keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// The permitted image and metaphor references.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardCatalog {
    #[serde(default)]
    pub images: Vec<Card>,
    #[serde(default)]
    pub metaphors: Vec<Card>,
}

/// Cards actually available to the player for one answer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedCards<'a> {
    pub images: Vec<&'a Card>,
    pub metaphors: Vec<&'a Card>,
}

impl CardCatalog {
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Look up selected card ids; a non-empty `activated` list narrows the result.
    pub fn resolve(&self, selections: &CardSelections) -> ResolvedCards<'_> {
        let permitted = |id: &String| {
            selections.activated.is_empty() || selections.activated.iter().any(|a| a == id)
        };

        ResolvedCards {
            images: lookup(&self.images, &selections.images, permitted),
            metaphors: lookup(&self.metaphors, &selections.metaphors, permitted),
        }
    }
}

fn lookup<'a>(
    cards: &'a [Card],
    ids: &[String],
    permitted: impl Fn(&String) -> bool,
) -> Vec<&'a Card> {
    ids.iter()
        .filter(|id| permitted(*id))
        .filter_map(|id| cards.iter().find(|card| &card.id == id))
        .collect()
}

/// Error raised while loading rubric or card configuration.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rubric criterion has an empty key")]
    EmptyKey,
    #[error("rubric criterion '{0}' is defined more than once")]
    DuplicateKey(String),
    #[error("only one criterion may grant the bonus point ('{first}' and '{second}' both do)")]
    MultipleBonus { first: String, second: String },
    #[error("rubric criterion key '{0}' is reserved")]
    ReservedKey(String),
}
