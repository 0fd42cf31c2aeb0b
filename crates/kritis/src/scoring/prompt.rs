use super::domain::BONUS_KEY;
use super::rubric::ActiveCriteriaSet;
use serde::{Deserialize, Serialize};

const SYSTEM_INSTRUCTION: &str =
    "Επέστρεψε μόνο έγκυρο JSON, χωρίς σχόλια, εξηγήσεις ή backticks.";

/// The question the player is answering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Mission {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Render the judge instructions for the active criteria, in rubric order.
pub fn judge_messages(
    active: &ActiveCriteriaSet<'_>,
    mission: &Mission,
    transcript: &str,
) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_INSTRUCTION),
        ChatMessage::user(rubric_instructions(active)),
        ChatMessage::user(format!(
            "Αποστολή: {} — {}",
            mission.title.trim(),
            mission.question.trim()
        )),
        ChatMessage::user(format!("Απάντηση παίκτη: {}", transcript.trim())),
    ]
}

fn rubric_instructions(active: &ActiveCriteriaSet<'_>) -> String {
    let mut lines = vec![format!(
        "Αξιολόγησε την απάντηση σύμφωνα με {} κριτήρια:",
        active.criteria().len()
    )];
    for (position, criterion) in active.criteria().iter().enumerate() {
        lines.push(format!("{}. {} (0–{})", position + 1, criterion.key, criterion.max));
    }

    let mut shape: Vec<String> = active
        .criteria()
        .iter()
        .map(|criterion| format!("\"{}\":0-{}", criterion.key, criterion.max))
        .collect();
    if active.grants_bonus() {
        lines.push(format!(
            "Δώσε \"{BONUS_KEY}\": 1 μόνο αν η απάντηση συνδυάζει εύστοχα εικόνα και μεταφορά."
        ));
        shape.push(format!("\"{BONUS_KEY}\":0-1"));
    }

    lines.push(String::new());
    lines.push("Επέστρεψε ΜΟΝΟ JSON της μορφής:".to_string());
    lines.push(format!(
        "{{\"criteria\":{{{}}},\"feedback\":\"σύντομο σχόλιο\"}}",
        shape.join(",")
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::catalog::RubricDefinition;
    use crate::scoring::domain::{Mode, ScoringContext};
    use crate::scoring::rubric::active_criteria;

    #[test]
    fn lists_active_criteria_in_rubric_order() {
        let rubric = RubricDefinition::standard();
        let active = active_criteria(&rubric, ScoringContext::new(1, Mode::Simple));
        let mission = Mission {
            title: "Η αρετή".to_string(),
            question: "Διδάσκεται η αρετή;".to_string(),
        };

        let messages = judge_messages(&active, &mission, "  Πιστεύω πως ναι.  ");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, ChatRole::System);
        let rubric_text = &messages[1].content;
        let position = rubric_text.find("1. Θέση (0–4)").expect("position listed");
        let argument = rubric_text
            .find("2. Επιχειρηματολογία (0–6)")
            .expect("argumentation listed");
        assert!(position < argument);
        assert!(!rubric_text.contains("Αντίρρηση"));
        assert!(!rubric_text.contains(BONUS_KEY));
        assert_eq!(messages[3].content, "Απάντηση παίκτη: Πιστεύω πως ναι.");
    }

    #[test]
    fn mentions_bonus_slot_when_granted() {
        let rubric = RubricDefinition::standard();
        let active = active_criteria(&rubric, ScoringContext::new(2, Mode::Advanced));

        let messages = judge_messages(&active, &Mission::default(), "");

        assert!(messages[1].content.contains("\"bonus\":0-1"));
    }
}
