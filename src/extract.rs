//! Per-record extraction
//!
//! Turns one raw record into an [`ArticleInfo`]. Missing fields at any depth
//! fall back to defaults; extraction never fails.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::affiliation::classify;
use crate::pubmed::{PubDate, PubmedArticle};

/// Title used when a record has no `ArticleTitle`
pub const NO_TITLE: &str = "No title";
/// Placeholder for a missing PMID or publication date
pub const UNKNOWN: &str = "Unknown";

/// Extraction result for one article
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleInfo {
    pub pubmed_id: String,
    pub title: String,
    pub publication_date: String,
    /// Affiliation strings (not author names) classified as non-academic
    pub non_academic_authors: BTreeSet<String>,
    pub company_affiliations: BTreeSet<String>,
    pub corresponding_emails: BTreeSet<String>,
}

impl ArticleInfo {
    pub fn has_company_affiliation(&self) -> bool {
        !self.company_affiliations.is_empty()
    }
}

/// "Year Month Day" from whichever parts are present, or `"Unknown"`
pub fn format_pub_date(pub_date: Option<&PubDate>) -> String {
    let Some(date) = pub_date else {
        return UNKNOWN.to_string();
    };

    let joined = [&date.year, &date.month, &date.day]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let trimmed = joined.trim();
    if trimmed.is_empty() {
        UNKNOWN.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Extract publication metadata and classified affiliations from a record
pub fn extract_article_info(record: &PubmedArticle) -> ArticleInfo {
    let pubmed_id = record.pmid().unwrap_or(UNKNOWN).to_string();
    let title = record.title().unwrap_or(NO_TITLE).to_string();
    let publication_date = format_pub_date(record.pub_date());

    let mut info = ArticleInfo {
        pubmed_id,
        title,
        publication_date,
        ..Default::default()
    };

    for author in record.authors() {
        for affiliation in author.affiliations() {
            let classification = classify(affiliation);
            trace!(
                author = %author.display_name(),
                affiliation,
                non_academic = classification.is_non_academic,
                company = classification.is_company,
                "Classified affiliation"
            );

            info.corresponding_emails.extend(classification.emails);
            if classification.is_non_academic {
                info.non_academic_authors.insert(affiliation.to_string());
            }
            if classification.is_company {
                info.company_affiliations.insert(affiliation.to_string());
            }
        }
    }

    info
}
