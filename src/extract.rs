// src/extract.rs
//! Structural extraction of feed entries.
//!
//! Walks the XML event stream and collects every `<item>` element in document
//! order, regardless of nesting depth. Registry feeds disagree on how deep
//! the channel sits, so the extractor does not pin a `rss/channel/item`
//! shape. Field text is XML-unescaped, HTML-entity decoded, and trimmed;
//! entries left without a title or link are dropped. Classification and
//! deduplication happen elsewhere.

use anyhow::{bail, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One feed entry as found in the document, before filtering and
/// classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published_raw: Option<String>,
}

/// Decode a fetched body to text: BOM first, then UTF-8 fast path, then the
/// charset named in the XML declaration, then lossy UTF-8.
pub fn decode_body(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = encoding_rs::Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    if let Some(encoding) = declared_encoding(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(bytes);
        return text.into_owned();
    }
    String::from_utf8_lossy(bytes).into_owned()
}

/// Pull `encoding="..."` out of the XML declaration, if any.
fn declared_encoding(bytes: &[u8]) -> Option<&'static encoding_rs::Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]).to_ascii_lowercase();
    let rest = &head[head.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let rest = &rest[1..];
    let label = &rest[..rest.find(quote)?];
    encoding_rs::Encoding::for_label(label.as_bytes())
}

/// Extract every feed entry from a decoded document.
///
/// Returns `Err` when the document is not well-formed XML; the fetch layer
/// treats that the same as a transport failure for the source.
pub fn extract_items(body: &str) -> Result<Vec<CandidateItem>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().check_end_names = true;

    let mut items = Vec::new();
    loop {
        match reader.read_event().context("malformed feed document")? {
            Event::Start(e) if e.name().as_ref() == b"item" => {
                if let Some(item) = read_item(&mut reader)? {
                    items.push(item);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(items)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Summary,
    Published,
}

#[derive(Default)]
struct RawItem {
    title: Option<String>,
    link: Option<String>,
    summary: Option<String>,
    published: Option<String>,
}

impl RawItem {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Summary => &mut self.summary,
            Field::Published => &mut self.published,
        }
    }
}

fn field_for(start: &BytesStart) -> Option<Field> {
    match start.name().as_ref() {
        b"title" => Some(Field::Title),
        b"link" => Some(Field::Link),
        b"description" | b"summary" => Some(Field::Summary),
        b"pubDate" | b"published" => Some(Field::Published),
        _ => None,
    }
}

/// Consume events up to the matching `</item>` and assemble one candidate.
/// First occurrence of each known child wins, later siblings are ignored.
fn read_item(reader: &mut Reader<&[u8]>) -> Result<Option<CandidateItem>> {
    let mut raw = RawItem::default();
    let mut depth = 0usize;
    let mut active: Option<Field> = None;

    loop {
        match reader.read_event().context("malformed feed entry")? {
            Event::Start(e) => {
                if depth == 0 {
                    active = match field_for(&e) {
                        Some(field) if raw.slot(field).is_none() => {
                            *raw.slot(field) = Some(String::new());
                            Some(field)
                        }
                        _ => None,
                    };
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 0 {
                    if let Some(field) = field_for(&e) {
                        raw.slot(field).get_or_insert_with(String::new);
                    }
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                if depth == 0 {
                    active = None;
                }
            }
            Event::Text(t) => {
                if let Some(field) = active {
                    let chunk = match t.unescape() {
                        Ok(cow) => cow.into_owned(),
                        // Unknown (HTML) entities stay literal here and are
                        // handled by the entity decode below.
                        Err(_) => String::from_utf8_lossy(t.as_ref()).into_owned(),
                    };
                    raw.slot(field).get_or_insert_with(String::new).push_str(&chunk);
                }
            }
            Event::CData(t) => {
                if let Some(field) = active {
                    let chunk = String::from_utf8_lossy(&t.into_inner()).into_owned();
                    raw.slot(field).get_or_insert_with(String::new).push_str(&chunk);
                }
            }
            Event::Eof => bail!("truncated feed document inside an entry"),
            _ => {}
        }
    }

    let title = clean_text(raw.title.as_deref().unwrap_or_default());
    let link = clean_text(raw.link.as_deref().unwrap_or_default());
    if title.is_empty() || link.is_empty() {
        return Ok(None);
    }
    let summary = clean_text(raw.summary.as_deref().unwrap_or_default());
    let published_raw = raw
        .published
        .map(|s| clean_text(&s))
        .filter(|s| !s.is_empty());

    Ok(Some(CandidateItem {
        title,
        link,
        summary,
        published_raw,
    }))
}

/// HTML entity decode, then trim.
fn clean_text(raw: &str) -> String {
    html_escape::decode_html_entities(raw).trim().to_string()
}
