//! # paper-fetcher
//!
//! Find PubMed articles with at least one company-affiliated author.
//!
//! The pipeline is: search and fetch raw records through a [`RecordSource`]
//! (normally [`PubMedClient`]), extract each record into an [`ArticleInfo`]
//! while classifying every author affiliation, keep only articles with a
//! company affiliation, then write them to the console or a CSV file.
//!
//! Classification is a transparent keyword heuristic, see [`affiliation`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use paper_fetcher_rs::{Destination, PubMedClient, RecordSource, filter_articles, write_batch};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PubMedClient::new();
//!     let records = client.fetch_records("monoclonal antibody", 20).await?;
//!
//!     let batch = filter_articles(&records);
//!     write_batch(&batch, &Destination::Console)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Classifying a single affiliation
//!
//! ```
//! use paper_fetcher_rs::classify;
//!
//! let result = classify("Department of Biology, Springfield University");
//! assert!(!result.is_non_academic);
//! assert!(!result.is_company);
//! ```

pub mod affiliation;
pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod output;
pub mod pubmed;
pub mod rate_limit;
pub mod retry;
pub mod source;

pub use affiliation::{
    ACADEMIC_KEYWORDS, AffiliationClassification, COMPANY_KEYWORDS, classify, extract_emails,
};
pub use config::ClientConfig;
pub use error::{FetchError, Result, WriteError};
pub use extract::{ArticleInfo, extract_article_info};
pub use filter::{FilteredBatch, filter_articles};
pub use output::{
    CSV_HEADERS, CsvRow, Destination, read_csv, save_to_csv, split_list, write_batch, write_console,
    write_csv,
};
pub use pubmed::{PubMedClient, PubmedArticle, parse_records_from_xml};
pub use retry::RetryConfig;
pub use source::RecordSource;

/// An opaque record as returned by the search/fetch collaborator
pub type RawRecord = PubmedArticle;
