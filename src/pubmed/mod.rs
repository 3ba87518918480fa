//! PubMed E-utilities access: the search/fetch client and the raw record model

pub mod client;
pub mod record;
mod responses;

pub use client::PubMedClient;
pub use record::{
    AffiliationInfo, Article, Author, AuthorList, Journal, JournalIssue, MedlineCitation, Pmid,
    PubDate, PubmedArticle, parse_records_from_xml,
};
