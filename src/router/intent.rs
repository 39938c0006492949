#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    GovernmentService,
    Journey,
    General,
}

pub struct IntentRule {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
}

/// Checked top to bottom; the first rule with a keyword in the query decides the intent.
pub const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::GovernmentService,
        keywords: &["passport", "mykad", "license", "permit", "renew"],
    },
    IntentRule {
        intent: Intent::Journey,
        keywords: &["how to go", "journey", "travel", "transport", "bus", "lrt", "mrt"],
    },
];

pub fn classify(query: &str) -> Intent {
    let query_lower = query.to_lowercase();
    INTENT_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| query_lower.contains(k)))
        .map(|rule| rule.intent)
        .unwrap_or(Intent::General)
}
