use crate::models::Severity;

const CRITICAL_TOKENS: &[&str] = &["emergency", "urgent", "immediate"];
const ELEVATED_TOKENS: &[&str] = &["gp", "doctor", "within"];

/// Derive a severity tag from free-text triage.
///
/// Critical tokens are checked before elevated ones, so "See GP within 24h;
/// urgent if breathing worsens" is critical. The backend is never required
/// to send a canonical value.
pub fn classify_triage(triage: Option<&str>) -> Severity {
    let Some(triage) = triage else {
        return Severity::Routine;
    };
    let lower = triage.to_lowercase();

    if CRITICAL_TOKENS.iter().any(|t| lower.contains(t)) {
        Severity::Critical
    } else if ELEVATED_TOKENS.iter().any(|t| lower.contains(t)) {
        Severity::Elevated
    } else {
        Severity::Routine
    }
}
