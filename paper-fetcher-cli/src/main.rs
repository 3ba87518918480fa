use anyhow::Result;
use clap::Parser;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "paper-fetcher",
    about = "Fetch research papers from PubMed and keep those with company-affiliated authors",
    long_about = "Searches PubMed, classifies every author affiliation with a keyword heuristic, \
                  and lists articles with at least one pharmaceutical or biotech company author"
)]
struct Cli {
    #[command(flatten)]
    fetch: commands::fetch::Fetch,

    /// Print debug information during execution
    #[arg(short, long)]
    debug: bool,

    /// API key for NCBI E-utilities (increases rate limit)
    #[arg(long, env = "NCBI_API_KEY")]
    api_key: Option<String>,

    /// Email for NCBI requests (recommended)
    #[arg(long, env = "NCBI_EMAIL")]
    email: Option<String>,

    /// Tool name for NCBI requests
    #[arg(long, env = "NCBI_TOOL", default_value = "paper-fetcher")]
    tool: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "info" };
    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(indicatif_layer.get_stderr_writer()),
        )
        .with(indicatif_layer)
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    if cli.debug {
        tracing::debug!(
            query = %cli.fetch.query,
            max_results = cli.fetch.max_results,
            output = ?cli.fetch.file,
            api_key_set = cli.api_key.is_some(),
            email_set = cli.email.is_some(),
            tool = %cli.tool,
            "Debug mode on"
        );
    }

    let client =
        commands::create_pubmed_client(cli.api_key.as_deref(), cli.email.as_deref(), &cli.tool);
    cli.fetch.execute(&client).await?;

    Ok(())
}
