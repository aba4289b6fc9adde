//! Composer helpers: send-button gating and quick-symptom chips.

/// Quick-symptom chips offered under the composer.
pub const QUICK_SYMPTOMS: &[&str] = &[
    "fever",
    "headache",
    "cough",
    "sore throat",
    "stomach pain",
    "rash",
    "back pain",
    "nausea",
];

/// The send button is enabled only when there is something to send.
pub fn can_send(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Text placed in the composer when a quick-symptom chip is selected.
pub fn quick_symptom_prompt(symptom: &str) -> String {
    format!("I have {}", symptom.trim())
}

/// Resolve a 1-based chip number to its prompt.
pub fn chip_prompt(number: usize) -> Option<String> {
    number
        .checked_sub(1)
        .and_then(|i| QUICK_SYMPTOMS.get(i))
        .map(|s| quick_symptom_prompt(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::{classify_message, MessageKind};

    #[test]
    fn send_gated_on_non_blank_text() {
        assert!(can_send("hi"));
        assert!(!can_send("   "));
        assert!(!can_send(""));
    }

    #[test]
    fn chip_fills_prompt() {
        assert_eq!(quick_symptom_prompt("fever"), "I have fever");
        assert_eq!(chip_prompt(2).as_deref(), Some("I have headache"));
        assert_eq!(chip_prompt(0), None);
        assert_eq!(chip_prompt(QUICK_SYMPTOMS.len() + 1), None);
    }

    #[test]
    fn every_chip_reaches_the_backend() {
        for symptom in QUICK_SYMPTOMS {
            assert_eq!(
                classify_message(&quick_symptom_prompt(symptom)),
                MessageKind::Medical,
                "chip {symptom} would be filtered locally"
            );
        }
    }
}
