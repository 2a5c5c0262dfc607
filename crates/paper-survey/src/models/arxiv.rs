//! arXiv Atom feed record format.

use serde::Deserialize;

/// Root `<feed>` element of an arXiv API response.
#[derive(Debug, Default, Deserialize)]
pub struct ArxivFeed {
    /// One `<entry>` per result.
    #[serde(rename = "entry", default)]
    pub entries: Vec<ArxivEntry>,
}

/// A single `<entry>`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArxivEntry {
    /// Abstract page URL, e.g. `http://arxiv.org/abs/1706.03762v7`.
    #[serde(default)]
    pub id: Option<String>,

    /// Title (may span lines).
    #[serde(default)]
    pub title: Option<String>,

    /// Abstract (may span lines).
    #[serde(default)]
    pub summary: Option<String>,

    /// First version timestamp (RFC 3339).
    #[serde(default)]
    pub published: Option<String>,

    /// Authors in byline order.
    #[serde(rename = "author", default)]
    pub authors: Vec<ArxivAuthor>,

    /// Alternate, PDF and DOI links.
    #[serde(rename = "link", default)]
    pub links: Vec<ArxivLink>,

    /// Subject classes.
    #[serde(rename = "category", default)]
    pub categories: Vec<ArxivCategory>,
}

impl ArxivEntry {
    /// The `<link title="pdf">` target, if present.
    #[must_use]
    pub fn pdf_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| {
                l.title.as_deref() == Some("pdf") || l.link_type.as_deref() == Some("application/pdf")
            })
            .and_then(|l| l.href.as_deref())
    }

    /// Whether this entry is the API's in-band error report.
    #[must_use]
    pub fn is_api_error(&self) -> bool {
        self.id.as_deref().is_some_and(|id| id.contains("/api/errors"))
    }
}

/// `<author>` element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArxivAuthor {
    /// Author's full name.
    #[serde(default)]
    pub name: Option<String>,
}

/// `<link>` element (attributes only).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArxivLink {
    /// Target URL.
    #[serde(rename = "@href", default)]
    pub href: Option<String>,

    /// `pdf` or `doi` for typed links.
    #[serde(rename = "@title", default)]
    pub title: Option<String>,

    /// Link relation (`alternate`, `related`).
    #[serde(rename = "@rel", default)]
    pub rel: Option<String>,

    /// MIME type.
    #[serde(rename = "@type", default)]
    pub link_type: Option<String>,
}

/// `<category>` element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArxivCategory {
    /// Subject class, e.g. `cs.CL`.
    #[serde(rename = "@term", default)]
    pub term: Option<String>,
}

/// Parse an Atom feed body.
pub fn parse_feed(xml: &str) -> Result<ArxivFeed, quick_xml::DeError> {
    quick_xml::de::from_str(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=attention</title>
  <id>http://arxiv.org/api/abc</id>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All
      You Need</title>
    <summary>The dominant sequence transduction models are based on complex
      recurrent or convolutional neural networks.</summary>
    <author><name>Ashish Vaswani</name></author>
    <author><name>Noam Shazeer</name></author>
    <link title="doi" href="http://dx.doi.org/10.1000/x" rel="related"/>
    <comment>15 pages</comment>
    <link href="http://arxiv.org/abs/1706.03762v7" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/1706.03762v7" rel="related" type="application/pdf"/>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed_entry() {
        let feed = parse_feed(FEED).unwrap();
        assert_eq!(feed.entries.len(), 1);

        let entry = &feed.entries[0];
        assert_eq!(entry.id.as_deref(), Some("http://arxiv.org/abs/1706.03762v7"));
        assert_eq!(entry.authors.len(), 2);
        assert_eq!(entry.links.len(), 3);
        assert_eq!(entry.pdf_link(), Some("http://arxiv.org/pdf/1706.03762v7"));
        assert_eq!(entry.categories.len(), 2);
        assert!(!entry.is_api_error());
    }

    #[test]
    fn test_parse_empty_feed() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>empty</title></feed>"#;
        let feed = parse_feed(xml).unwrap();
        assert!(feed.entries.is_empty());
    }
}
