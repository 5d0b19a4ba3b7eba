//! Byte-level decoding and parsing shared by POM and listing documents.

use std::borrow::Cow;
use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use regex::bytes::Regex;
use roxmltree::{Document, ParsingOptions};

static DECLARED_ENCODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*<\?xml\s[^?]*?\bencoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#).unwrap()
});

/// The charset named in the XML declaration, if it is one we can apply to an
/// ASCII-compatible byte stream.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let label = DECLARED_ENCODING.captures(bytes)?.get(1)?.as_bytes();
    Encoding::for_label(label).filter(|encoding| *encoding != UTF_16LE && *encoding != UTF_16BE)
}

/// Turn a response body into text. A byte-order mark wins over the
/// declaration; with neither the body must be UTF-8. `ISO-8859-1` resolves
/// to windows-1252, which decodes every byte.
pub fn decode(bytes: &[u8]) -> Result<String, String> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes).unwrap_or(UTF_8), bytes),
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(Cow::into_owned)
        .ok_or_else(|| format!("malformed {} byte sequence", encoding.name()))
}

/// Parse a document, accepting an internal or external DOCTYPE. External
/// entities are never resolved.
pub fn parse(text: &str) -> Result<Document<'_>, String> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options).map_err(|e| e.to_string())
}
