use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{FetchError, Result};
use crate::pubmed::record::{PubmedArticle, parse_records_from_xml};
use crate::pubmed::responses::ESearchResult;
use crate::rate_limit::RateLimiter;
use crate::retry::with_retry;
use crate::source::RecordSource;

/// ESearch cannot return results past this offset
const MAX_RETRIEVABLE: usize = 9999;

/// NCBI recommends at most 200 IDs per EFetch request
const FETCH_BATCH_SIZE: usize = 200;

/// Client for the PubMed ESearch/EFetch endpoints
#[derive(Clone)]
pub struct PubMedClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    config: ClientConfig,
}

impl PubMedClient {
    /// Client with default configuration (anonymous, 3 requests/second)
    ///
    /// ```
    /// use paper_fetcher_rs::PubMedClient;
    ///
    /// let client = PubMedClient::new();
    /// ```
    pub fn new() -> Self {
        Self::with_config(ClientConfig::new())
    }

    /// ```
    /// use paper_fetcher_rs::{ClientConfig, PubMedClient};
    ///
    /// let config = ClientConfig::new()
    ///     .with_api_key("your_api_key_here")
    ///     .with_email("analyst@example.com");
    ///
    /// let client = PubMedClient::with_config(config);
    /// ```
    pub fn with_config(config: ClientConfig) -> Self {
        let client = Client::builder()
            .user_agent(config.effective_user_agent())
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.effective_base_url().to_string(),
            rate_limiter: config.create_rate_limiter(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Search PubMed and return matching PMIDs, most relevant first
    ///
    /// # Errors
    ///
    /// * `FetchError::SearchLimitExceeded` - `limit` is above 9999
    /// * `FetchError::ApiError` - non-success status or an ESearch `ERROR`
    /// * `FetchError::RequestError` / `FetchError::JsonError` - transport or decoding failure
    #[instrument(skip(self), fields(query = %query, limit = limit))]
    pub async fn search_articles(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        if limit > MAX_RETRIEVABLE {
            return Err(FetchError::SearchLimitExceeded {
                requested: limit,
                maximum: MAX_RETRIEVABLE,
            });
        }

        if query.trim().is_empty() || limit == 0 {
            debug!("Empty query or zero limit, returning empty results");
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/esearch.fcgi?db=pubmed&term={}&retmax={}&retmode=json",
            self.base_url,
            urlencoding::encode(query),
            limit
        );

        let response = self.make_request(&url).await?;
        let search_result: ESearchResult = serde_json::from_str(&response.text().await?)?;

        if let Some(error_msg) = search_result.esearchresult.error {
            return Err(FetchError::ApiError {
                status: 200,
                message: format!("NCBI ESearch API error: {}", error_msg),
            });
        }

        let total_count: usize = search_result
            .esearchresult
            .count
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or(0);

        info!(
            total = total_count,
            returned = search_result.esearchresult.idlist.len(),
            "Search completed"
        );

        Ok(search_result.esearchresult.idlist)
    }

    /// Fetch full records for the given PMIDs, in batches
    #[instrument(skip(self), fields(pmids_count = pmids.len()))]
    pub async fn fetch_by_pmids(&self, pmids: &[&str]) -> Result<Vec<PubmedArticle>> {
        let mut records = Vec::with_capacity(pmids.len());

        for chunk in pmids.chunks(FETCH_BATCH_SIZE) {
            let url = format!(
                "{}/efetch.fcgi?db=pubmed&id={}&retmode=xml",
                self.base_url,
                chunk.join(",")
            );

            debug!(batch_size = chunk.len(), "Making batch EFetch API request");
            let response = self.make_request(&url).await?;
            let xml_text = response.text().await?;

            if xml_text.trim().is_empty() {
                warn!(batch_size = chunk.len(), "EFetch returned an empty body");
                continue;
            }

            let batch = parse_records_from_xml(&xml_text)?;
            debug!(
                requested = chunk.len(),
                parsed = batch.len(),
                "Batch fetch completed"
            );
            records.extend(batch);
        }

        Ok(records)
    }

    /// ESearch followed by EFetch of every hit
    pub async fn search_and_fetch(&self, query: &str, limit: usize) -> Result<Vec<PubmedArticle>> {
        let pmids = self.search_articles(query, limit).await?;
        if pmids.is_empty() {
            return Ok(Vec::new());
        }

        let pmid_refs: Vec<&str> = pmids.iter().map(String::as_str).collect();
        self.fetch_by_pmids(&pmid_refs).await
    }

    /// GET with rate limiting, retries, and the configured api_key/email/tool
    /// parameters appended.
    async fn make_request(&self, url: &str) -> Result<Response> {
        let mut final_url = url.to_string();
        let api_params = self.config.build_api_params();

        if !api_params.is_empty() {
            final_url.push(if url.contains('?') { '&' } else { '?' });
            let param_strings: Vec<String> = api_params
                .into_iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
                .collect();
            final_url.push_str(&param_strings.join("&"));
        }

        let response = with_retry(
            || async {
                self.rate_limiter.acquire().await?;
                debug!(url = %final_url, "Making API request");
                let response = self
                    .client
                    .get(&final_url)
                    .send()
                    .await
                    .map_err(FetchError::from)?;

                let status = response.status();
                if status.is_server_error() || status.as_u16() == 429 {
                    return Err(FetchError::ApiError {
                        status: status.as_u16(),
                        message: status
                            .canonical_reason()
                            .unwrap_or("Unknown error")
                            .to_string(),
                    });
                }

                Ok(response)
            },
            &self.config.retry_config,
            "NCBI API request",
        )
        .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "API request failed");
            return Err(FetchError::ApiError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            });
        }

        Ok(response)
    }
}

impl Default for PubMedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSource for PubMedClient {
    async fn fetch_records(&self, query: &str, max_results: usize) -> Result<Vec<PubmedArticle>> {
        self.search_and_fetch(query, max_results).await
    }
}
