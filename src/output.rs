//! Rendering a filtered batch
//!
//! Two sinks share one column contract: a CSV file (header plus one row per
//! article) and a labeled console block per article. Set-valued fields are
//! joined with `"; "` in sorted order.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::WriteError;
use crate::extract::ArticleInfo;

/// Column names, in output order
pub const CSV_HEADERS: [&str; 6] = [
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Authors",
    "Company Affiliations",
    "Corresponding Emails",
];

pub const LIST_SEPARATOR: &str = "; ";

const CONSOLE_SEPARATOR_WIDTH: usize = 40;

/// Where a batch is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Console,
    File(PathBuf),
}

/// One flattened CSV row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRow {
    #[serde(rename = "PubmedID")]
    pub pubmed_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Publication Date")]
    pub publication_date: String,
    #[serde(rename = "Non-academic Authors")]
    pub non_academic_authors: String,
    #[serde(rename = "Company Affiliations")]
    pub company_affiliations: String,
    #[serde(rename = "Corresponding Emails")]
    pub corresponding_emails: String,
}

impl From<&ArticleInfo> for CsvRow {
    fn from(article: &ArticleInfo) -> Self {
        Self {
            pubmed_id: article.pubmed_id.clone(),
            title: article.title.clone(),
            publication_date: article.publication_date.clone(),
            non_academic_authors: join_list(&article.non_academic_authors),
            company_affiliations: join_list(&article.company_affiliations),
            corresponding_emails: join_list(&article.corresponding_emails),
        }
    }
}

/// Split a joined list field back into its members
pub fn split_list(field: &str) -> Vec<String> {
    if field.is_empty() {
        return Vec::new();
    }
    field.split(LIST_SEPARATOR).map(str::to_string).collect()
}

fn join_list<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

/// Write the header and one quoted row per article
pub fn write_csv<W: Write>(batch: &[ArticleInfo], writer: W) -> Result<(), WriteError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CSV_HEADERS)?;
    for article in batch {
        csv_writer.serialize(CsvRow::from(article))?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Create (or truncate) `path` and write the batch as CSV
#[instrument(skip(batch), fields(rows = batch.len(), path = %path.display()))]
pub fn save_to_csv(batch: &[ArticleInfo], path: &Path) -> Result<(), WriteError> {
    let file = File::create(path)?;
    write_csv(batch, file)?;
    debug!("CSV written");
    Ok(())
}

/// Parse CSV produced by [`write_csv`]
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<CsvRow>, WriteError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let rows = csv_reader
        .deserialize()
        .collect::<Result<Vec<CsvRow>, csv::Error>>()?;
    Ok(rows)
}

/// Six labeled lines per article followed by a dashed separator
pub fn write_console<W: Write>(batch: &[ArticleInfo], mut writer: W) -> Result<(), WriteError> {
    let separator = "-".repeat(CONSOLE_SEPARATOR_WIDTH);

    for article in batch {
        let row = CsvRow::from(article);
        writeln!(writer, "PubMed ID: {}", row.pubmed_id)?;
        writeln!(writer, "Title: {}", row.title)?;
        writeln!(writer, "Publication Date: {}", row.publication_date)?;
        writeln!(writer, "Non-academic Authors: {}", row.non_academic_authors)?;
        writeln!(writer, "Company Affiliations: {}", row.company_affiliations)?;
        writeln!(writer, "Corresponding Emails: {}", row.corresponding_emails)?;
        writeln!(writer, "{}", separator)?;
    }
    writer.flush()?;

    Ok(())
}

/// Send the batch to `destination`
pub fn write_batch(batch: &[ArticleInfo], destination: &Destination) -> Result<(), WriteError> {
    match destination {
        Destination::Console => write_console(batch, io::stdout().lock()),
        Destination::File(path) => {
            save_to_csv(batch, path)?;
            info!(path = %path.display(), articles = batch.len(), "Results saved to file");
            Ok(())
        }
    }
}
