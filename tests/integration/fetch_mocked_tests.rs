//! ESearch/EFetch round trips against a mocked NCBI endpoint

mod common;

use std::time::Duration;

use common::{article_set_xml, article_xml, author_xml};
use paper_fetcher_rs::{
    ClientConfig, FetchError, PubMedClient, RecordSource, RetryConfig, filter_articles,
};
use tracing_test::traced_test;
use wiremock::matchers::{method, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn esearch_body(ids: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "header": { "type": "esearch", "version": "0.3" },
        "esearchresult": {
            "count": ids.len().to_string(),
            "retmax": ids.len().to_string(),
            "retstart": "0",
            "idlist": ids,
        }
    })
}

fn efetch_body() -> String {
    article_set_xml(&[
        article_xml(
            "40000001",
            "Antibody engineering at scale",
            (Some("2024"), Some("Mar"), None),
            &[
                author_xml("Chen", &["Amgen Inc, Thousand Oaks, CA. chen@amgen.com"]),
                author_xml("Diaz", &["Stanford University School of Medicine"]),
            ],
        ),
        article_xml(
            "40000002",
            "A purely academic study",
            (Some("2023"), None, None),
            &[author_xml("Evans", &["Department of Physics, Oxford University"])],
        ),
    ])
}

fn mock_client(server: &MockServer, retry_config: RetryConfig) -> PubMedClient {
    let config = ClientConfig::new()
        .with_base_url(server.uri())
        .with_rate_limit(100.0)
        .with_retry_config(retry_config);
    PubMedClient::with_config(config)
}

fn fast_retries(max_retries: usize) -> RetryConfig {
    RetryConfig::new()
        .with_max_retries(max_retries)
        .with_initial_delay(Duration::from_millis(10))
        .with_max_delay(Duration::from_millis(50))
        .without_jitter()
}

#[tokio::test]
#[traced_test]
async fn test_search_then_fetch_through_record_source() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/esearch\.fcgi$"))
        .and(query_param("term", "antibody engineering"))
        .and(query_param("retmax", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(esearch_body(&["40000001", "40000002"])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"/efetch\.fcgi$"))
        .and(query_param("id", "40000001,40000002"))
        .and(query_param("retmode", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(efetch_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server, RetryConfig::disabled());
    let source: &dyn RecordSource = &client;
    let records = source.fetch_records("antibody engineering", 5).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].pmid(), Some("40000001"));

    let batch = filter_articles(&records);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].pubmed_id, "40000001");
    assert_eq!(batch[0].publication_date, "2024 Mar");
    assert!(batch[0].corresponding_emails.contains("chen@amgen.com"));
}

#[tokio::test]
async fn test_empty_search_skips_efetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/esearch\.fcgi$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(esearch_body(&[])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"/efetch\.fcgi$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(efetch_body()))
        .expect(0)
        .mount(&server)
        .await;

    let client = mock_client(&server, RetryConfig::disabled());
    let records = client.search_and_fetch("nothing matches this", 20).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_esearch_error_field_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/esearch\.fcgi$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "esearchresult": { "ERROR": "Invalid query syntax" }
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server, RetryConfig::disabled());
    let err = client.search_articles("((broken", 10).await.unwrap_err();

    match err {
        FetchError::ApiError { status, message } => {
            assert_eq!(status, 200);
            assert!(message.contains("Invalid query syntax"));
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_retried_then_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/esearch\.fcgi$"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = mock_client(&server, fast_retries(2));
    let err = client.search_articles("cancer", 10).await.unwrap_err();

    assert!(matches!(err, FetchError::ApiError { status: 500, .. }));
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/esearch\.fcgi$"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server, fast_retries(3));
    let err = client.search_articles("cancer", 10).await.unwrap_err();

    assert!(matches!(err, FetchError::ApiError { status: 400, .. }));
}

#[tokio::test]
async fn test_transient_failure_recovers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/esearch\.fcgi$"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"/esearch\.fcgi$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(esearch_body(&["1"])))
        .mount(&server)
        .await;

    let client = mock_client(&server, fast_retries(2));
    let ids = client.search_articles("cancer", 10).await.unwrap();
    assert_eq!(ids, vec!["1".to_string()]);
}

#[tokio::test]
async fn test_search_limit_rejected_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = mock_client(&server, RetryConfig::disabled());
    let err = client.search_articles("cancer", 10_000).await.unwrap_err();

    assert!(matches!(
        err,
        FetchError::SearchLimitExceeded {
            requested: 10_000,
            maximum: 9999
        }
    ));
}

#[tokio::test]
async fn test_credentials_and_tool_are_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/esearch\.fcgi$"))
        .and(query_param("api_key", "secret-key"))
        .and(query_param("email", "analyst@example.com"))
        .and(query_param("tool", "paper-fetcher"))
        .respond_with(ResponseTemplate::new(200).set_body_json(esearch_body(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new()
        .with_base_url(server.uri())
        .with_api_key("secret-key")
        .with_email("analyst@example.com")
        .with_retry_config(RetryConfig::disabled());
    let client = PubMedClient::with_config(config);

    let ids = client.search_articles("cancer", 5).await.unwrap();
    assert!(ids.is_empty());
}

#[tokio::test]
async fn test_malformed_efetch_body_is_xml_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/efetch\.fcgi$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<PubmedArticleSet><PubmedArticle>"))
        .mount(&server)
        .await;

    let client = mock_client(&server, RetryConfig::disabled());
    let err = client.fetch_by_pmids(&["1"]).await.unwrap_err();
    assert!(matches!(err, FetchError::XmlError(_)));
}
