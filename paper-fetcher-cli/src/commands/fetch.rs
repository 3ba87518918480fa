use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use paper_fetcher_rs::{Destination, RecordSource, filter_articles, write_batch};
use tracing::info;

#[derive(Args, Debug)]
pub struct Fetch {
    /// Search query for fetching research papers
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Save the results as CSV to this file instead of printing them
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Maximum number of PubMed results to fetch
    #[arg(short = 'n', long, default_value = "20")]
    pub max_results: usize,
}

/// How a run ended when nothing failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NoArticles,
    NoMatches,
    Written { articles: usize },
}

impl Fetch {
    fn destination(&self) -> Destination {
        match &self.file {
            Some(path) => Destination::File(path.clone()),
            None => Destination::Console,
        }
    }

    pub async fn execute(&self, source: &dyn RecordSource) -> Result<Outcome> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("Failed to set progress bar style")?,
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(format!("Searching PubMed for \"{}\"", self.query));

        let fetched = source.fetch_records(&self.query, self.max_results).await;
        spinner.finish_and_clear();

        let records = fetched.context("An error occurred while fetching articles")?;

        if records.is_empty() {
            info!("No articles found.");
            return Ok(Outcome::NoArticles);
        }

        let batch = filter_articles(&records);
        if batch.is_empty() {
            info!(fetched = records.len(), "No articles matched the filtering criteria.");
            return Ok(Outcome::NoMatches);
        }

        write_batch(&batch, &self.destination()).context("Failed to save results")?;

        Ok(Outcome::Written {
            articles: batch.len(),
        })
    }
}
