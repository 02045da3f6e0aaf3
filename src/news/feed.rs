//! Minimal RSS/Atom item extraction
//!
//! Pulls title, link, date and summary out of `<item>`/`<entry>` blocks.
//! Anything else in the feed is ignored.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// One feed entry before filtering
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    pub summary: String,
}

fn item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<(item|entry)\b[^>]*>(.*?)</(?:item|entry)>").expect("valid regex"))
}

fn tag_re(tag: &str) -> Regex {
    Regex::new(&format!(r"(?is)<{tag}\b[^>]*>(.*?)</{tag}>")).expect("valid regex")
}

fn atom_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?is)<link\b[^>]*\bhref\s*=\s*"([^"]*)""#).expect("valid regex"))
}

fn html_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"))
}

struct TagSet {
    title: Regex,
    link: Regex,
    pub_date: Regex,
    published: Regex,
    updated: Regex,
    dc_date: Regex,
    description: Regex,
    summary: Regex,
}

fn tags() -> &'static TagSet {
    static TAGS: OnceLock<TagSet> = OnceLock::new();
    TAGS.get_or_init(|| TagSet {
        title: tag_re("title"),
        link: tag_re("link"),
        pub_date: tag_re("pubDate"),
        published: tag_re("published"),
        updated: tag_re("updated"),
        dc_date: tag_re("dc:date"),
        description: tag_re("description"),
        summary: tag_re("summary"),
    })
}

fn capture(re: &Regex, block: &str) -> Option<String> {
    re.captures(block)
        .and_then(|c| c.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|s| !s.is_empty())
}

/// Strip CDATA wrappers and markup, decode the common entities
pub fn clean_text(raw: &str) -> String {
    let text = raw.trim();
    let text = text
        .strip_prefix("<![CDATA[")
        .and_then(|t| t.strip_suffix("]]>"))
        .unwrap_or(text);
    let text = html_tag_re().replace_all(text, "");
    decode_entities(&text).split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&#8217;", "\u{2019}")
        .replace("&#8216;", "\u{2018}")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Parse an RFC 2822 (RSS) or RFC 3339 (Atom) timestamp
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

/// Extract every item of an RSS or Atom document
pub fn parse_feed(body: &str) -> Vec<FeedEntry> {
    let t = tags();

    item_re()
        .captures_iter(body)
        .filter_map(|caps| caps.get(2))
        .map(|m| {
            let block = m.as_str();
            let link = capture(&t.link, block)
                .or_else(|| {
                    atom_link_re()
                        .captures(block)
                        .and_then(|c| c.get(1))
                        .map(|m| decode_entities(m.as_str()))
                })
                .unwrap_or_default();
            let published = [&t.pub_date, &t.published, &t.dc_date, &t.updated]
                .into_iter()
                .find_map(|re| capture(re, block).and_then(|s| parse_date(&s)));
            let summary = capture(&t.description, block)
                .or_else(|| capture(&t.summary, block))
                .unwrap_or_default();

            FeedEntry {
                title: capture(&t.title, block).unwrap_or_default(),
                link,
                published,
                summary,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
<title>Crypto News</title>
<item>
  <title><![CDATA[Bitcoin surges past $100k]]></title>
  <link>https://example.com/btc</link>
  <pubDate>Sat, 17 Oct 2026 10:30:00 +0000</pubDate>
  <description><![CDATA[<p>BTC rallied &amp; broke <b>records</b>.</p>]]></description>
</item>
<item>
  <title>ETH upgrade &amp; fees</title>
  <link>https://example.com/eth</link>
</item>
</channel></rss>"#;

    const ATOM: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom">
<entry>
  <title>Solana outage resolved</title>
  <link rel="alternate" href="https://example.com/sol"/>
  <updated>2026-10-17T08:00:00Z</updated>
  <summary>Validators restarted.</summary>
</entry>
</feed>"#;

    #[test]
    fn test_parse_rss_items() {
        let entries = parse_feed(RSS);
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].title, "Bitcoin surges past $100k");
        assert_eq!(entries[0].link, "https://example.com/btc");
        assert_eq!(
            entries[0].published,
            Some(Utc.with_ymd_and_hms(2026, 10, 17, 10, 30, 0).unwrap())
        );
        assert_eq!(entries[0].summary, "BTC rallied & broke records.");

        assert_eq!(entries[1].title, "ETH upgrade & fees");
        assert!(entries[1].published.is_none());
        assert!(entries[1].summary.is_empty());
    }

    #[test]
    fn test_parse_atom_entries() {
        let entries = parse_feed(ATOM);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Solana outage resolved");
        assert_eq!(entries[0].link, "https://example.com/sol");
        assert_eq!(
            entries[0].published,
            Some(Utc.with_ymd_and_hms(2026, 10, 17, 8, 0, 0).unwrap())
        );
        assert_eq!(entries[0].summary, "Validators restarted.");
    }

    #[test]
    fn test_parse_garbage_yields_nothing() {
        assert!(parse_feed("<html><body>not a feed</body></html>").is_empty());
        assert!(parse_feed("").is_empty());
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("Sat, 17 Oct 2026 10:30:00 GMT").is_some());
        assert!(parse_date("2026-10-17T10:30:00+02:00").is_some());
        assert!(parse_date("yesterday").is_none());
    }
}
