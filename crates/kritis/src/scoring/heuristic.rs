use super::catalog::{Card, CardCatalog};
use super::domain::{CardSelections, CriterionSpec, PhilosopherContext, RawCriterionScores, BONUS_KEY};
use super::normalizer::{contains_term, count_term, fold, significant_words};
use super::rubric::ActiveCriteriaSet;
use std::collections::BTreeSet;

/// Prefix of feedback produced without the remote judge.
pub const LOCAL_FEEDBACK_HEADER: &str = "🧠 Τοπική εκτίμηση χωρίς AI.";

/// Distinct image and metaphor keyword hits must exceed this to earn the bonus.
const BONUS_MIN_DISTINCT_HITS: usize = 3;

// Marker lists are stored already folded (no accents, lowercase, final sigma as σ).
const STANCE_MARKERS: &[&str] = &[
    "πιστευω",
    "θεωρω",
    "υποστηριζω",
    "κατα τη γνωμη μου",
    "η θεση μου",
    "i believe",
    "i hold that",
    "i think",
    "in my view",
];

const CAUSAL_MARKERS: &[&str] = &[
    "γιατι",
    "επειδη",
    "διοτι",
    "αρα",
    "επομενωσ",
    "συνεπωσ",
    "because",
    "therefore",
    "thus",
    "hence",
];

const EXAMPLE_MARKERS: &[&str] = &[
    "π.χ.",
    "οπωσ",
    "για παραδειγμα",
    "παραδειγματοσ χαρη",
    "for example",
    "for instance",
    "such as",
    "e.g.",
];

const CONTRAST_MARKERS: &[&str] = &[
    "δεν συμφωνω",
    "ομωσ",
    "αντιθετα",
    "παρολα αυτα",
    "σε απαντηση",
    "however",
    "i disagree",
    "on the contrary",
    "nevertheless",
];

const REBUTTAL_MARKERS: &[&str] = &[
    "το επιχειρημα σου δεν στεκει",
    "δεν στεκει γιατι",
    "your argument does not hold",
    "that argument fails because",
];

/// Scoring rule attached to a criterion key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicRule {
    Position,
    Argumentation,
    Imagery,
    Example,
    CounterArgument,
}

impl HeuristicRule {
    /// Resolve the rule for a rubric key, accepting Greek keys and English aliases.
    pub fn for_key(key: &str) -> Option<Self> {
        match fold(key).as_str() {
            "θεση" | "position" | "thesis" | "stance" => Some(Self::Position),
            "επιχειρηματολογια" | "τεκμηριωση" | "argumentation" | "reasoning" => {
                Some(Self::Argumentation)
            }
            "εικονα/μεταφορα" | "εικονα" | "μεταφορα" | "imagery" | "metaphor"
            | "imagery/metaphor" => Some(Self::Imagery),
            "παραδειγμα" | "example" => Some(Self::Example),
            "αντιρρηση" | "αντεπιχειρημα" | "counter-argument" | "counterargument"
            | "objection" => Some(Self::CounterArgument),
            _ => None,
        }
    }
}

/// Score a learner's answer with keyword rules; no external calls.
pub fn score(
    transcript: &str,
    active: &ActiveCriteriaSet<'_>,
    catalog: &CardCatalog,
    selections: &CardSelections,
    philosopher: &PhilosopherContext,
) -> RawCriterionScores {
    let text = fold(transcript);
    let cards = catalog.resolve(selections);
    let mut scores = RawCriterionScores::default();
    let mut summary = Vec::new();

    for criterion in active.criteria() {
        let value = match HeuristicRule::for_key(&criterion.key) {
            Some(HeuristicRule::Position) => position(&text, philosopher, criterion.max),
            Some(HeuristicRule::Argumentation) => argumentation(&text, criterion.max),
            Some(HeuristicRule::Imagery) => {
                let imagery = imagery(&text, &cards.images, &cards.metaphors, criterion.max);
                if criterion.bonus && imagery.earns_bonus {
                    scores.insert(BONUS_KEY, 1u32);
                }
                imagery.score
            }
            Some(HeuristicRule::Example) => example(&text, criterion.max),
            Some(HeuristicRule::CounterArgument) => counter_argument(&text, criterion.max),
            None => 0,
        };
        let value = value.min(criterion.max);

        scores.insert(criterion.key.clone(), value);
        summary.push(summary_entry(criterion, value));
    }

    let feedback = if summary.is_empty() {
        LOCAL_FEEDBACK_HEADER.to_string()
    } else {
        format!("{LOCAL_FEEDBACK_HEADER} {}", summary.join("; "))
    };
    scores.feedback = Some(feedback.into());
    scores
}

fn summary_entry(criterion: &CriterionSpec, value: u32) -> String {
    format!("{} {}/{}", criterion.key, value, criterion.max)
}

fn partial(max: u32) -> u32 {
    max.div_ceil(2)
}

fn any_marker(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| contains_term(text, marker))
}

fn position(text: &str, philosopher: &PhilosopherContext, max: u32) -> u32 {
    let named = philosopher
        .philosopher
        .as_deref()
        .map(|name| significant_words(&fold(name)))
        .is_some_and(|words| words.iter().any(|word| contains_term(text, word)));

    let echoed = philosopher
        .position
        .as_deref()
        .map(|position| significant_words(&fold(position)))
        .is_some_and(|words| words.iter().any(|word| contains_term(text, word)));

    if named || echoed {
        max
    } else if any_marker(text, STANCE_MARKERS) {
        partial(max)
    } else {
        0
    }
}

fn argumentation(text: &str, max: u32) -> u32 {
    let connectives: usize = CAUSAL_MARKERS
        .iter()
        .map(|marker| count_term(text, marker))
        .sum();
    u32::try_from(connectives).unwrap_or(u32::MAX).min(max)
}

struct ImageryScore {
    score: u32,
    earns_bonus: bool,
}

fn keyword_hits(text: &str, cards: &[&Card]) -> BTreeSet<String> {
    cards
        .iter()
        .flat_map(|card| card.keywords.iter())
        .map(|keyword| fold(keyword))
        .filter(|keyword| contains_term(text, keyword))
        .collect()
}

fn imagery(text: &str, images: &[&Card], metaphors: &[&Card], max: u32) -> ImageryScore {
    let image_hits = keyword_hits(text, images);
    let metaphor_hits = keyword_hits(text, metaphors);
    let both = !image_hits.is_empty() && !metaphor_hits.is_empty();

    let score = if both {
        max
    } else if image_hits.is_empty() && metaphor_hits.is_empty() {
        0
    } else {
        partial(max)
    };

    let distinct = image_hits.union(&metaphor_hits).count();
    ImageryScore {
        score,
        earns_bonus: both && distinct > BONUS_MIN_DISTINCT_HITS,
    }
}

fn example(text: &str, max: u32) -> u32 {
    let distinct = EXAMPLE_MARKERS
        .iter()
        .filter(|marker| contains_term(text, marker))
        .count();
    match distinct {
        0 => 0,
        1 => partial(max),
        _ => max,
    }
}

fn counter_argument(text: &str, max: u32) -> u32 {
    if any_marker(text, REBUTTAL_MARKERS) {
        max
    } else if any_marker(text, CONTRAST_MARKERS) {
        max.saturating_sub(1).max(max.min(1))
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_tables_are_stored_folded() {
        for table in [
            STANCE_MARKERS,
            CAUSAL_MARKERS,
            EXAMPLE_MARKERS,
            CONTRAST_MARKERS,
            REBUTTAL_MARKERS,
        ] {
            for marker in table {
                assert_eq!(fold(marker), *marker, "marker {marker} is not folded");
            }
        }
    }

    #[test]
    fn resolves_rules_from_greek_and_english_keys() {
        assert_eq!(HeuristicRule::for_key("Θέση"), Some(HeuristicRule::Position));
        assert_eq!(
            HeuristicRule::for_key("Εικόνα/Μεταφορά"),
            Some(HeuristicRule::Imagery)
        );
        assert_eq!(
            HeuristicRule::for_key("Counter-Argument"),
            Some(HeuristicRule::CounterArgument)
        );
        assert_eq!(HeuristicRule::for_key("Σαφήνεια"), None);
    }

    #[test]
    fn argumentation_counts_connectives_up_to_max() {
        let text = fold("Το λέω γιατί ισχύει, επειδή το είδα, άρα έχω δίκιο.");
        assert_eq!(argumentation(&text, 6), 3);
        assert_eq!(argumentation(&text, 2), 2);
    }

    #[test]
    fn argumentation_ignores_partial_word_collisions() {
        let text = fold("Η αραχνη και ο αραβασ");
        assert_eq!(argumentation(&text, 6), 0);
    }

    #[test]
    fn example_credit_grows_with_distinct_markers() {
        assert_eq!(example(&fold("Όπως η αρετή."), 3), 2);
        assert_eq!(example(&fold("Π.χ. η αρετή, όπως λέει ο Πλάτων."), 3), 3);
        assert_eq!(example(&fold("Καμία αναφορά."), 3), 0);
    }

    #[test]
    fn counter_argument_prefers_explicit_rebuttal() {
        assert_eq!(counter_argument(&fold("Όμως δεν είναι έτσι."), 4), 3);
        assert_eq!(
            counter_argument(&fold("Το επιχείρημά σου δεν στέκει, γιατί..."), 4),
            4
        );
        assert_eq!(counter_argument(&fold("Όμως."), 1), 1);
        assert_eq!(counter_argument(&fold("Συμφωνώ."), 4), 0);
    }

    #[test]
    fn position_rewards_naming_or_echoing_the_assignment() {
        let context = PhilosopherContext {
            philosopher: Some("Σωκράτης".to_string()),
            position: Some("Η αρετή είναι γνώση".to_string()),
        };
        assert_eq!(position(&fold("Ο Σωκράτης έχει δίκιο."), &context, 4), 4);
        assert_eq!(position(&fold("Η γνώση μας σώζει."), &context, 4), 4);
        assert_eq!(position(&fold("Πιστεύω ότι έχει δίκιο."), &context, 4), 2);
        assert_eq!(position(&fold("Δεν ξέρω."), &context, 4), 0);
    }
}
