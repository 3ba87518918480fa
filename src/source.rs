use async_trait::async_trait;

use crate::error::Result;
use crate::pubmed::PubmedArticle;

/// Anything that can turn a search query into raw records
///
/// The filter pipeline only depends on this boundary. Any transport,
/// credential or retry failure comes back as a [`FetchError`](crate::FetchError);
/// a query with no matches is `Ok` with an empty vector.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_records(&self, query: &str, max_results: usize) -> Result<Vec<PubmedArticle>>;
}
