use tracing::{debug, instrument};

use crate::extract::{ArticleInfo, extract_article_info};
use crate::pubmed::PubmedArticle;

/// Articles that survived filtering, in input order
pub type FilteredBatch = Vec<ArticleInfo>;

/// Extract every record and keep those with at least one company affiliation
///
/// Input order is preserved. An empty input yields an empty batch.
#[instrument(skip(records), fields(records = records.len()))]
pub fn filter_articles(records: &[PubmedArticle]) -> FilteredBatch {
    let batch: FilteredBatch = records
        .iter()
        .map(extract_article_info)
        .filter(ArticleInfo::has_company_affiliation)
        .collect();

    debug!(
        input = records.len(),
        kept = batch.len(),
        "Filtered records by company affiliation"
    );

    batch
}
