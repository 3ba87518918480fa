//! Raw PubMed records
//!
//! A typed view of the parts of an EFetch `<PubmedArticle>` this crate reads.
//! Every element is optional: PubMed records are frequently incomplete and
//! nothing downstream should fail because a level of nesting is missing.
//!
//! Each `<PubmedArticle>` is deserialized on its own. Other children of the
//! set (`<PubmedBookArticle>`, `<DeleteCitation>`) are skipped, and a record
//! that still fails to deserialize is logged and dropped without affecting
//! its neighbours.

use std::sync::OnceLock;

use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::reader::Reader;
use regex::{Captures, Regex};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::{FetchError, Result};

/// One `<PubmedArticle>`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PubmedArticle {
    #[serde(rename = "MedlineCitation", default)]
    pub medline_citation: Option<MedlineCitation>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MedlineCitation {
    #[serde(rename = "PMID", default)]
    pub pmid: Option<Pmid>,
    #[serde(rename = "Article", default)]
    pub article: Option<Article>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Pmid {
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Article {
    #[serde(rename = "ArticleTitle", default)]
    pub title: Option<String>,
    #[serde(rename = "Journal", default)]
    pub journal: Option<Journal>,
    #[serde(rename = "AuthorList", default)]
    pub author_list: Option<AuthorList>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Journal {
    #[serde(rename = "JournalIssue", default)]
    pub journal_issue: Option<JournalIssue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JournalIssue {
    #[serde(rename = "PubDate", default)]
    pub pub_date: Option<PubDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PubDate {
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "Month", default)]
    pub month: Option<String>,
    #[serde(rename = "Day", default)]
    pub day: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuthorList {
    #[serde(rename = "Author", default)]
    pub authors: Vec<Author>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Author {
    #[serde(rename = "LastName", default)]
    pub last_name: Option<String>,
    #[serde(rename = "ForeName", default)]
    pub fore_name: Option<String>,
    #[serde(rename = "CollectiveName", default)]
    pub collective_name: Option<String>,
    #[serde(rename = "AffiliationInfo", default)]
    pub affiliation_info: Vec<AffiliationInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AffiliationInfo {
    #[serde(rename = "Affiliation", default)]
    pub affiliation: Option<String>,
}

impl PubmedArticle {
    fn article(&self) -> Option<&Article> {
        self.medline_citation.as_ref()?.article.as_ref()
    }

    pub fn pmid(&self) -> Option<&str> {
        self.medline_citation
            .as_ref()?
            .pmid
            .as_ref()
            .map(|p| p.value.trim())
    }

    pub fn title(&self) -> Option<&str> {
        self.article()?.title.as_deref()
    }

    pub fn pub_date(&self) -> Option<&PubDate> {
        self.article()?
            .journal
            .as_ref()?
            .journal_issue
            .as_ref()?
            .pub_date
            .as_ref()
    }

    /// Authors in record order; empty when the list is absent
    pub fn authors(&self) -> &[Author] {
        self.article()
            .and_then(|a| a.author_list.as_ref())
            .map(|list| list.authors.as_slice())
            .unwrap_or_default()
    }
}

impl Author {
    /// Affiliation strings attached to this author, absent text as `""`
    pub fn affiliations(&self) -> impl Iterator<Item = &str> {
        self.affiliation_info
            .iter()
            .map(|info| info.affiliation.as_deref().unwrap_or(""))
    }

    /// Display name, for logs
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.collective_name {
            return name.clone();
        }
        match (&self.fore_name, &self.last_name) {
            (Some(fore), Some(last)) => format!("{} {}", fore, last),
            (None, Some(last)) => last.clone(),
            (Some(fore), None) => fore.clone(),
            (None, None) => "Unknown author".to_string(),
        }
    }
}

const ARTICLE_TAG: &[u8] = b"PubmedArticle";
const ARTICLE_SET_TAG: &[u8] = b"PubmedArticleSet";

fn xml_error(e: impl std::fmt::Display) -> FetchError {
    FetchError::XmlError(format!("Failed to deserialize XML: {}", e))
}

/// Flatten markup inside `<ArticleTitle>` and `<Affiliation>` to its text
///
/// Titles and affiliations carry arbitrary inline markup (`<i>`, `<sup>`,
/// `<sc>`, MathML) that a plain text field cannot hold. Surrounding
/// whitespace is left untouched, so `Effect of <sc>l</sc>-dopa` reads as
/// `Effect of l-dopa`.
pub(crate) fn flatten_text_markup(xml: &str) -> String {
    static TEXT_ELEMENT_REGEXES: OnceLock<[Regex; 2]> = OnceLock::new();
    static ANY_TAG_REGEX: OnceLock<Regex> = OnceLock::new();

    let elements = TEXT_ELEMENT_REGEXES.get_or_init(|| {
        ["ArticleTitle", "Affiliation"].map(|tag| {
            Regex::new(&format!(r"(?s)(<{tag}(?:\s[^>/]*)?>)(.*?)(</{tag}>)"))
                .expect("Failed to compile text element regex")
        })
    });
    let any_tag =
        ANY_TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]*>").expect("Failed to compile tag regex"));

    let mut flattened = xml.to_string();
    for element in elements {
        flattened = element
            .replace_all(&flattened, |caps: &Captures| {
                format!("{}{}{}", &caps[1], any_tag.replace_all(&caps[2], ""), &caps[3])
            })
            .into_owned();
    }

    if flattened.len() != xml.len() {
        debug!(
            removed_bytes = xml.len() - flattened.len(),
            "Flattened inline markup"
        );
    }
    flattened
}

/// Bodies of the `<PubmedArticle>` children of the set, in document order
///
/// Fails only when the document itself is not well-formed or has no
/// `<PubmedArticleSet>` root.
fn article_fragments(xml: &str) -> Result<Vec<&str>> {
    let mut reader = Reader::from_str(xml);
    let mut fragments = Vec::new();
    let mut saw_root = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) if e.name().as_ref() == ARTICLE_SET_TAG => saw_root = true,
            Event::Empty(e) if e.name().as_ref() == ARTICLE_SET_TAG => saw_root = true,
            Event::Start(e) if e.name().as_ref() == ARTICLE_TAG => {
                let span = reader.read_to_end(QName(ARTICLE_TAG)).map_err(xml_error)?;
                let body = xml
                    .get(span.start as usize..span.end as usize)
                    .ok_or_else(|| xml_error("record span out of bounds"))?;
                fragments.push(body);
            }
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                debug!(
                    element = %String::from_utf8_lossy(&name),
                    "Skipping non-article entry"
                );
                reader.read_to_end(QName(&name)).map_err(xml_error)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(xml_error("missing <PubmedArticleSet> root"));
    }
    Ok(fragments)
}

/// Parse every `<PubmedArticle>` in an EFetch XML response, in document order
///
/// Records that cannot be deserialized are skipped with a warning.
///
/// # Errors
///
/// * `FetchError::XmlError` - the response is not well-formed XML or is not a
///   `<PubmedArticleSet>`
#[instrument(skip(xml), fields(xml_size = xml.len()))]
pub fn parse_records_from_xml(xml: &str) -> Result<Vec<PubmedArticle>> {
    let cleaned_xml = flatten_text_markup(xml);
    let fragments = article_fragments(&cleaned_xml)?;

    let mut records = Vec::with_capacity(fragments.len());
    for (index, body) in fragments.into_iter().enumerate() {
        match from_str::<PubmedArticle>(&format!("<PubmedArticle>{}</PubmedArticle>", body)) {
            Ok(record) => records.push(record),
            Err(e) => warn!(index, error = %e, "Failed to parse record, skipping"),
        }
    }

    debug!(records = records.len(), "Parsed EFetch response");
    Ok(records)
}
