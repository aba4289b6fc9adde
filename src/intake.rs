//! Input sanitizer: decides whether a chat message goes to the backend.
//!
//! The filter is a cheap substring test, not NLP. False positives ("cold
//! brew") and false negatives are accepted; its only job is to keep obvious
//! chit-chat off the analysis endpoint.

use rand::Rng;

/// Substrings that mark a message as a medical query.
pub const MEDICAL_KEYWORDS: &[&str] = &[
    "pain", "hurt", "sick", "fever", "cough", "headache", "nausea", "vomit", "dizzy", "rash",
    "swollen", "bleed", "breath", "chest", "stomach", "throat", "cold", "flu", "symptom",
    "feel",
];

/// Replies used when a message does not look medical.
pub const CLARIFYING_REPLIES: &[&str] = &[
    "I'm here to help with medical concerns. Could you describe any symptoms you're experiencing?",
    "I specialize in symptom assessment. Please tell me about any health issues you're having.",
    "For medical assistance, please describe your symptoms and I'll do my best to help.",
];

/// How a submitted message should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Medical,
    General,
}

/// Trim raw composer text. `None` when nothing is left to send.
pub fn sanitize(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Classify a message by case-insensitive keyword membership.
pub fn classify_message(text: &str) -> MessageKind {
    let lower = text.to_lowercase();
    if MEDICAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
        MessageKind::Medical
    } else {
        MessageKind::General
    }
}

/// Canned reply for a given variant index. Out-of-range indices wrap.
pub fn clarifying_reply(variant: usize) -> &'static str {
    CLARIFYING_REPLIES[variant % CLARIFYING_REPLIES.len()]
}

/// Draw a reply variant. Presentation-only, so an unseeded thread RNG is fine.
pub fn random_reply_variant() -> usize {
    rand::thread_rng().gen_range(0..CLARIFYING_REPLIES.len())
}
