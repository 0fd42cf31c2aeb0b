use super::catalog::RubricDefinition;
use super::domain::{CriterionSpec, ScoringContext};

/// Criteria in play for one round and mode, in rubric order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCriteriaSet<'a> {
    criteria: Vec<&'a CriterionSpec>,
    out_of: u32,
}

impl<'a> ActiveCriteriaSet<'a> {
    /// Build a set from already-filtered criteria. `out_of` adds one shared
    /// bonus point when any criterion grants it.
    pub fn from_criteria(criteria: Vec<&'a CriterionSpec>) -> Self {
        let max_sum = criteria
            .iter()
            .map(|criterion| criterion.max)
            .fold(0u32, u32::saturating_add);
        let bonus = u32::from(criteria.iter().any(|criterion| criterion.bonus));
        Self {
            out_of: max_sum.saturating_add(bonus),
            criteria,
        }
    }

    pub fn criteria(&self) -> &[&'a CriterionSpec] {
        &self.criteria
    }

    pub fn out_of(&self) -> u32 {
        self.out_of
    }

    pub fn grants_bonus(&self) -> bool {
        self.criteria.iter().any(|criterion| criterion.bonus)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.criteria.iter().map(|criterion| criterion.key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&'a CriterionSpec> {
        self.criteria
            .iter()
            .copied()
            .find(|criterion| criterion.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

/// Filter the rubric down to the criteria scored for `context`.
pub fn active_criteria(rubric: &RubricDefinition, context: ScoringContext) -> ActiveCriteriaSet<'_> {
    let criteria = rubric
        .criteria()
        .iter()
        .filter(|criterion| criterion.applies_to(&context))
        .collect();
    ActiveCriteriaSet::from_criteria(criteria)
}
