//! Plain-text extraction from HWPX package entries.
//!
//! Only the body parts under `Contents/` are read: numbered sections plus
//! the header, document and content parts. Style, settings and media
//! entries are ignored. Markup is stripped flatly, without an XML parser.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::zip::{Archive, SkipReason, read_entries};

/// Body-content entries, case-insensitive.
static CONTENT_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^contents/(?:[^/]+/)*(?:section\d+|header|document|content)\.xml$")
        .expect("content entry pattern")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Entities decoded after tags are removed, in this order.
///
/// `&amp;` comes last so an escaped entity such as `&amp;lt;` decodes to
/// the literal text `&lt;` instead of `<`.
const ENTITIES: [(&str, &str); 4] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
];

/// Whether an entry name is one of the package's body-content parts.
pub fn is_content_entry(name: &str) -> bool {
    CONTENT_ENTRY.is_match(name)
}

/// Strip tags, decode the basic entities and normalize whitespace.
pub fn strip_markup(xml: &str) -> String {
    let mut text = TAG.replace_all(xml, "").into_owned();
    for (entity, literal) in ENTITIES {
        text = text.replace(entity, literal);
    }
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Join the text of every content entry in `archive`.
///
/// Entries are visited in lexical name order, so `section10.xml` comes
/// before `section2.xml`. Each block is labelled `[<entry name>]` and
/// blocks are separated by a blank line.
pub fn extract_text(archive: &Archive<'_>) -> Result<String> {
    let mut parts: Vec<(&str, &[u8])> = archive
        .iter()
        .filter(|(name, _)| is_content_entry(name))
        .collect();

    if parts.is_empty() {
        tracing::debug!(entries = archive.len(), "no content entries in package");
        return Err(Error::NoContent);
    }
    parts.sort_by(|a, b| a.0.cmp(b.0));

    let blocks: Vec<String> = parts
        .into_iter()
        .filter_map(|(name, bytes)| {
            let text = strip_markup(&String::from_utf8_lossy(bytes));
            if text.is_empty() {
                tracing::debug!(%name, "content entry has no text");
                return None;
            }
            Some(format!("[{}]\n{}", name, text))
        })
        .collect();

    let joined = blocks.join("\n\n");
    if joined.trim().is_empty() {
        return Err(Error::NoContent);
    }

    Ok(joined)
}

/// Extract the document text of an HWPX package held in memory.
///
/// Structural damage only shortens the set of entries that are read. If
/// that leaves nothing and a content entry was dropped because it could
/// not be inflated, the decompression failure is reported instead of
/// [`Error::NoContent`].
pub fn extract_hwpx_text(data: &[u8]) -> Result<String> {
    let archive = read_entries(data);
    let result = extract_text(&archive);

    match result {
        Err(Error::NoContent) => {
            let failed = archive.into_skipped().into_iter().find_map(|skipped| {
                match skipped.reason {
                    SkipReason::Decompression(source) if is_content_entry(&skipped.name) => {
                        Some(Error::Decompression {
                            name: skipped.name,
                            source,
                        })
                    }
                    _ => None,
                }
            });
            Err(failed.unwrap_or(Error::NoContent))
        }
        other => other,
    }
}
