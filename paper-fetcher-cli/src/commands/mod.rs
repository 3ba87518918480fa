pub mod fetch;

use paper_fetcher_rs::{ClientConfig, PubMedClient};

pub fn create_pubmed_client(api_key: Option<&str>, email: Option<&str>, tool: &str) -> PubMedClient {
    let mut config = ClientConfig::new().with_tool(tool);

    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }

    if let Some(email) = email {
        config = config.with_email(email);
    }

    PubMedClient::with_config(config)
}
