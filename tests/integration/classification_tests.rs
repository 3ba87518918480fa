//! Affiliation classification through the public API

use std::collections::BTreeSet;

use paper_fetcher_rs::{ACADEMIC_KEYWORDS, COMPANY_KEYWORDS, classify, extract_emails};
use rstest::rstest;

const SAMPLE_AFFILIATIONS: &[&str] = &[
    "Acme Pharma Inc, Boston, contact: jdoe@acme.com",
    "Department of Biology, Springfield University",
    "Genentech Inc, 1 DNA Way, South San Francisco, CA 94080, USA",
    "Novartis Institutes for BioMedical Research, Cambridge, MA",
    "Roche Diagnostics GmbH, Penzberg, Germany. info@roche.com",
    "Division of Cardiology, Massachusetts General Hospital, Boston",
    "Centers for Disease Control and Prevention, Atlanta, GA",
    "AstraZeneca UK Ltd, Cambridge",
    "Harvard Medical School; Moderna, Inc.",
    "",
    "   ",
    "Kyoto University Hospital, Japan. a-b.c@kuhp.kyoto-u.ac.jp",
];

#[test]
fn test_industry_affiliation_scenario() {
    let result = classify("Acme Pharma Inc, Boston, contact: jdoe@acme.com");
    assert!(result.is_non_academic);
    assert!(result.is_company);
    assert_eq!(result.emails, BTreeSet::from(["jdoe@acme.com".to_string()]));
}

#[test]
fn test_university_affiliation_scenario() {
    let result = classify("Department of Biology, Springfield University");
    assert!(!result.is_non_academic);
    assert!(!result.is_company);
    assert!(result.emails.is_empty());
}

#[test]
fn test_non_academic_matches_keyword_absence() {
    for affiliation in SAMPLE_AFFILIATIONS.iter().filter(|a| !a.is_empty()) {
        let lower = affiliation.to_lowercase();
        let has_academic = ACADEMIC_KEYWORDS.iter().any(|k| lower.contains(k));
        assert_eq!(
            classify(affiliation).is_non_academic,
            !has_academic,
            "non-academic mismatch for {:?}",
            affiliation
        );
    }
}

#[test]
fn test_company_matches_keyword_presence() {
    for affiliation in SAMPLE_AFFILIATIONS.iter().filter(|a| !a.is_empty()) {
        let lower = affiliation.to_lowercase();
        let has_company = COMPANY_KEYWORDS.iter().any(|k| lower.contains(k));
        assert_eq!(
            classify(affiliation).is_company,
            has_company,
            "company mismatch for {:?}",
            affiliation
        );
    }
}

#[test]
fn test_classification_is_repeatable() {
    for affiliation in SAMPLE_AFFILIATIONS {
        assert_eq!(classify(affiliation), classify(affiliation));
    }
}

#[test]
fn test_whitespace_only_is_non_academic() {
    // Only the empty string is exempt from the keyword checks
    let result = classify("   ");
    assert!(result.is_non_academic);
    assert!(!result.is_company);
}

#[rstest]
#[case("Harvard Medical School; Moderna, Inc.", false, true)]
#[case("Novartis Institutes for BioMedical Research, Cambridge, MA", false, false)]
#[case("AstraZeneca UK Ltd, Cambridge", true, true)]
#[case("Centers for Disease Control and Prevention, Atlanta, GA", true, false)]
fn test_mixed_cases(#[case] affiliation: &str, #[case] non_academic: bool, #[case] company: bool) {
    let result = classify(affiliation);
    assert_eq!(result.is_non_academic, non_academic);
    assert_eq!(result.is_company, company);
}

#[rstest]
#[case("no email here", &[])]
#[case("write to a-b.c@kuhp.kyoto-u.ac.jp now", &["a-b.c@kuhp.kyoto-u.ac.jp"])]
#[case("x@y.org, z@w.net; x@y.org", &["x@y.org", "z@w.net"])]
fn test_email_extraction(#[case] text: &str, #[case] expected: &[&str]) {
    let expected: BTreeSet<String> = expected.iter().map(|e| e.to_string()).collect();
    assert_eq!(extract_emails(text), expected);
}
