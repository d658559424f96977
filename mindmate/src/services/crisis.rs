use std::sync::LazyLock;

use regex::Regex;

/// Phrases that flag a session for human follow-up.
pub const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "suicidal",
    "kill myself",
    "end my life",
    "want to die",
    "better off dead",
    "no reason to live",
    "self harm",
    "self-harm",
    "hurt myself",
    "cut myself",
    "overdose",
    "marna chahta",
    "marna chahti",
    "jeena nahi chahta",
    "jeena nahi chahti",
];

#[allow(clippy::expect_used)]
static CRISIS_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = CRISIS_KEYWORDS
        .iter()
        .map(|keyword| regex::escape(keyword).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternatives})\b")).expect("valid regex")
});

/// Case-insensitive whole-word scan. Returns each matched keyword once, in
/// order of first appearance.
pub fn detect_crisis_keywords(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for m in CRISIS_RE.find_iter(text) {
        let normalized = m
            .as_str()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if !found.contains(&normalized) {
            found.push(normalized);
        }
    }
    found
}
