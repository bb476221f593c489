//! Atom / RSS 2.0 entry extraction.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use super::error::FetchError;
use super::types::FeedEntry;

/// Which direct child of an entry is collecting text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
}

/// An entry being assembled while its element is open.
#[derive(Debug, Default)]
struct PartialEntry {
    depth: usize,
    title: String,
    /// `<link href>` with `rel="alternate"` or no rel (Atom).
    alternate: Option<String>,
    /// Any other `<link href>`.
    other: Option<String>,
    /// `<link>` text content (RSS).
    link_text: String,
}

impl PartialEntry {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    fn consider_link(&mut self, e: &BytesStart<'_>) -> Result<(), FetchError> {
        let Some(href) = attribute(e, "href")? else {
            return Ok(());
        };
        match attribute(e, "rel")?.as_deref() {
            None | Some("alternate") => {
                if self.alternate.is_none() {
                    self.alternate = Some(href);
                }
            }
            Some(_) => {
                if self.other.is_none() {
                    self.other = Some(href);
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Option<FeedEntry> {
        let text = self.link_text.trim();
        let identifier = self
            .alternate
            .or_else(|| (!text.is_empty()).then(|| text.to_string()))
            .or(self.other)?;
        Some(FeedEntry {
            title: self.title.trim().to_string(),
            identifier: identifier.trim().to_string(),
        })
    }
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, FetchError> {
    let attr = e
        .try_get_attribute(name)
        .map_err(|err| FetchError::parse(err.to_string()))?;
    attr.map(|a| {
        a.unescape_value()
            .map(|v| v.into_owned())
            .map_err(|err| FetchError::parse(err.to_string()))
    })
    .transpose()
}

fn is_entry(name: &[u8]) -> bool {
    name == b"entry" || name == b"item"
}

fn is_feed_root(name: &[u8]) -> bool {
    matches!(name, b"feed" | b"rss" | b"RDF")
}

/// Extract `(title, identifier)` entries from an Atom or RSS document.
///
/// Entries keep document order. Only direct children of an entry are read,
/// so namespaced extensions such as `<media:group><media:title>` do not
/// override the entry title. Entries without any link are skipped.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, FetchError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut current: Option<PartialEntry> = None;
    let mut capture: Option<Field> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                let name = e.local_name();
                if depth == 1 && !is_feed_root(name.as_ref()) {
                    return Err(FetchError::parse(format!(
                        "unexpected root element <{}>",
                        String::from_utf8_lossy(name.as_ref())
                    )));
                }
                match current.as_mut() {
                    None if is_entry(name.as_ref()) => {
                        current = Some(PartialEntry::new(depth));
                    }
                    Some(entry) if depth == entry.depth + 1 => {
                        capture = match name.as_ref() {
                            b"title" => Some(Field::Title),
                            b"link" => {
                                entry.consider_link(e)?;
                                Some(Field::Link)
                            }
                            _ => None,
                        };
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                if depth == 0 && !is_feed_root(e.local_name().as_ref()) {
                    return Err(FetchError::parse("document has no feed element"));
                }
                if let Some(entry) = current.as_mut() {
                    if depth == entry.depth && e.local_name().as_ref() == b"link" {
                        entry.consider_link(e)?;
                    }
                }
            }
            Ok(Event::Text(ref t)) => {
                if let (Some(field), Some(entry)) = (capture, current.as_mut()) {
                    let text = t
                        .unescape()
                        .map_err(|err| FetchError::parse(err.to_string()))?;
                    match field {
                        Field::Title => entry.title.push_str(&text),
                        Field::Link => entry.link_text.push_str(&text),
                    }
                }
            }
            Ok(Event::CData(ref c)) => {
                if let (Some(field), Some(entry)) = (capture, current.as_mut()) {
                    let text = String::from_utf8_lossy(c);
                    match field {
                        Field::Title => entry.title.push_str(&text),
                        Field::Link => entry.link_text.push_str(&text),
                    }
                }
            }
            Ok(Event::End(_)) => {
                let closes_entry = current.as_ref().is_some_and(|entry| entry.depth == depth);
                if closes_entry {
                    if let Some(entry) = current.take().and_then(PartialEntry::finish) {
                        entries.push(entry);
                    } else {
                        debug!("Skipping feed entry without a link");
                    }
                } else if current
                    .as_ref()
                    .is_some_and(|entry| depth == entry.depth + 1)
                {
                    capture = None;
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(FetchError::parse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(FetchError::parse("unexpected end of document"));
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATOM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:media="http://search.yahoo.com/mrss/">
  <title>Channel</title>
  <link rel="self" href="https://www.youtube.com/feeds/videos.xml?channel_id=UC1"/>
  <entry>
    <id>yt:video:aaa</id>
    <title>First &amp; best</title>
    <link rel="alternate" href="https://www.youtube.com/watch?v=aaa"/>
    <media:group>
      <media:title>Not the title</media:title>
    </media:group>
  </entry>
  <entry>
    <title>Second</title>
    <link rel="related" href="https://example.com/related"/>
    <link href="https://www.youtube.com/watch?v=bbb"/>
  </entry>
</feed>"#;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Podcast</title>
    <link>https://example.com/</link>
    <item>
      <title><![CDATA[Episode 1]]></title>
      <link>https://example.com/ep1.mp3</link>
    </item>
    <item>
      <title>No link here</title>
    </item>
    <item>
      <link> https://example.com/ep2.mp3 </link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_atom_entries_in_order() {
        let entries = parse_feed(ATOM).unwrap();
        assert_eq!(
            entries,
            vec![
                FeedEntry::new("First & best", "https://www.youtube.com/watch?v=aaa"),
                FeedEntry::new("Second", "https://www.youtube.com/watch?v=bbb"),
            ]
        );
    }

    #[test]
    fn test_parse_rss_items() {
        let entries = parse_feed(RSS).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], FeedEntry::new("Episode 1", "https://example.com/ep1.mp3"));
        // Missing title becomes empty, link text is trimmed
        assert_eq!(entries[1], FeedEntry::new("", "https://example.com/ep2.mp3"));
    }

    #[test]
    fn test_parse_non_alternate_link_as_fallback() {
        let xml = r#"<feed><entry><title>x</title><link rel="enclosure" href="https://cdn/x.m4a"/></entry></feed>"#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries[0].identifier, "https://cdn/x.m4a");
    }

    #[test]
    fn test_parse_empty_feed() {
        let entries = parse_feed(r#"<feed xmlns="http://www.w3.org/2005/Atom"></feed>"#).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_parse_mismatched_tags_fails() {
        let result = parse_feed("<feed><entry></feed>");
        assert!(matches!(result, Err(FetchError::Parse { .. })));
    }

    #[test]
    fn test_parse_html_is_rejected() {
        let result = parse_feed("<html><body>Not found</body></html>");
        assert!(matches!(result, Err(FetchError::Parse { .. })));
    }

    #[test]
    fn test_parse_truncated_document_fails() {
        let result = parse_feed("<rss><channel><item><link>https://x</link>");
        assert!(matches!(result, Err(FetchError::Parse { .. })));
    }
}
