//! Affiliation classification
//!
//! A keyword heuristic: an affiliation is *non-academic*
//! when it mentions none of [`ACADEMIC_KEYWORDS`], and a *company* affiliation
//! when it mentions any of [`COMPANY_KEYWORDS`]. Both checks are
//! case-insensitive substring matches, so "corp" also matches "Corporation"
//! (and, as a known false positive, words like "incorporated" or "Princeton").

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Substrings that mark an affiliation as academic
pub const ACADEMIC_KEYWORDS: [&str; 6] = [
    "university",
    "college",
    "institute",
    "hospital",
    "clinic",
    "school",
];

/// Substrings that mark an affiliation as a company
pub const COMPANY_KEYWORDS: [&str; 8] = [
    "inc", "ltd", "corp", "pharma", "biotech", "company", "llc", "gmbh",
];

/// Result of classifying one affiliation string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffiliationClassification {
    pub is_non_academic: bool,
    pub is_company: bool,
    /// Email addresses embedded in the affiliation text
    pub emails: BTreeSet<String>,
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX
        .get_or_init(|| Regex::new(r"[\w.-]+@[\w.-]+").expect("Failed to compile email regex"))
}

/// Collect every email-looking substring of `text`
pub fn extract_emails(text: &str) -> BTreeSet<String> {
    email_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn contains_any(haystack_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| haystack_lower.contains(keyword))
}

/// Classify a free-text affiliation
///
/// Total over any input. An empty string is neither non-academic nor a
/// company and carries no emails.
///
/// ```
/// use paper_fetcher_rs::classify;
///
/// let result = classify("Acme Pharma Inc, Boston, contact: jdoe@acme.com");
/// assert!(result.is_non_academic);
/// assert!(result.is_company);
/// assert!(result.emails.contains("jdoe@acme.com"));
/// ```
pub fn classify(affiliation: &str) -> AffiliationClassification {
    let emails = extract_emails(affiliation);

    if affiliation.is_empty() {
        return AffiliationClassification {
            emails,
            ..Default::default()
        };
    }

    let lower = affiliation.to_lowercase();

    AffiliationClassification {
        is_non_academic: !contains_any(&lower, &ACADEMIC_KEYWORDS),
        is_company: contains_any(&lower, &COMPANY_KEYWORDS),
        emails,
    }
}
