use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Case-fold, strip diacritics and control characters, and collapse whitespace.
///
/// Greek final sigma folds to `σ` so inflected word endings compare equal.
pub fn fold(text: &str) -> String {
    let stripped: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    stripped
        .to_lowercase()
        .replace('ς', "σ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Word-boundary-safe containment over already-folded inputs.
pub fn contains_term(text: &str, term: &str) -> bool {
    boundary_matches(text, term).next().is_some()
}

/// Number of word-boundary-safe occurrences of `term` in `text`.
pub fn count_term(text: &str, term: &str) -> usize {
    boundary_matches(text, term).count()
}

// Folded function words long enough to pass the length filter.
const STOP_WORDS: &[&str] = &[
    "ειναι", "αυτο", "αυτη", "αυτα", "οταν", "οπου", "επισησ", "μπορει", "πρεπει",
    "that", "this", "with", "from", "have", "which", "there", "their", "about",
];

/// Alphanumeric words of at least four characters, minus common function
/// words, used as echo keywords.
pub fn significant_words(text: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for word in text.split(|c: char| !c.is_alphanumeric()) {
        if word.chars().count() >= 4
            && !STOP_WORDS.contains(&word)
            && !words.iter().any(|known| known == word)
        {
            words.push(word.to_string());
        }
    }
    words
}

// A rejected occurrence only advances the search by one character, so an
// overlapping occurrence that satisfies the guards is still found.
fn boundary_matches<'a>(text: &'a str, term: &'a str) -> impl Iterator<Item = usize> + 'a {
    let guard_start = term.chars().next().is_some_and(char::is_alphanumeric);
    let guard_end = term.chars().next_back().is_some_and(char::is_alphanumeric);
    let step = term.chars().next().map_or(0, char::len_utf8);
    let mut from = 0;

    std::iter::from_fn(move || {
        if term.is_empty() {
            return None;
        }
        loop {
            let start = from + text[from..].find(term)?;
            let end = start + term.len();
            let before = text[..start].chars().next_back();
            let after = text[end..].chars().next();
            let start_ok = !guard_start || !before.is_some_and(char::is_alphanumeric);
            let end_ok = !guard_end || !after.is_some_and(char::is_alphanumeric);

            if start_ok && end_ok {
                from = end;
                return Some(start);
            }
            from = start + step;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_strips_greek_accents_and_case() {
        assert_eq!(fold("Θέση ΑΡΙΣΤΟΤΈΛΗΣ"), "θεση αριστοτελησ");
        assert_eq!(fold("Διότι   όμως"), "διοτι ομωσ");
    }

    #[test]
    fn fold_replaces_control_characters() {
        assert_eq!(fold("a\u{0007}b\r\nc"), "a b c");
    }

    #[test]
    fn fold_is_idempotent() {
        let once = fold("Ο Σωκράτης, π.χ., είπε «γνῶθι σαυτόν».");
        assert_eq!(fold(&once), once);
    }

    #[test]
    fn contains_term_respects_word_boundaries() {
        let text = fold("Η καθαρότητα του λόγου");
        assert!(!contains_term(&text, "καθαρ"));
        assert!(contains_term(&text, "λογου"));
        assert!(!contains_term("therefore", "the"));
        assert!(contains_term("so, the end", "the"));
    }

    #[test]
    fn punctuated_terms_match_inside_sentences() {
        let text = fold("Υπάρχουν πολλά, π.χ. η δικαιοσύνη");
        assert!(contains_term(&text, "π.χ."));
    }

    #[test]
    fn count_term_counts_each_bounded_hit() {
        let text = fold("Γιατί; Γιατί έτσι. Γιατίδες όχι.");
        assert_eq!(count_term(&text, "γιατι"), 2);
    }

    #[test]
    fn rejected_occurrence_does_not_hide_overlapping_one() {
        assert!(contains_term("ba.a.a", "a.a"));
        assert_eq!(count_term("ba.a.a", "a.a"), 1);
        assert_eq!(count_term("π.χ.χ. και π.χ.", "π.χ."), 2);
    }

    #[test]
    fn empty_term_never_matches() {
        assert!(!contains_term("anything", ""));
        assert_eq!(count_term("anything", ""), 0);
    }

    #[test]
    fn significant_words_skip_short_function_and_duplicate_words() {
        let words = significant_words("η αρετη ειναι γνωση και αρετη");
        assert_eq!(words, vec!["αρετη", "γνωση"]);
    }
}
