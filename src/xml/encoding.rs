use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Decodes a raw document to UTF-8 and strips its XML declaration.
///
/// Encoding precedence:
/// 1. A UTF-8 or UTF-16 byte-order mark
/// 2. The `encoding` pseudo-attribute of the document's XML declaration
/// 3. The transport hint (bare label or Content-Type `charset=` parameter)
/// 4. UTF-8
///
/// Unknown labels fall back to UTF-8. Malformed sequences are replaced
/// with U+FFFD rather than failing, since a partially garbled feed is
/// still more useful than none.
///
/// The declaration is removed because it would otherwise describe the
/// original bytes, not the decoded text handed to the XML reader.
///
/// # Examples
///
/// ```
/// use feednorm::xml::normalize_encoding;
///
/// let text = normalize_encoding(b"<?xml version=\"1.0\" encoding=\"iso-8859-1\"?><t>caf\xe9</t>", None);
/// assert_eq!(text, "<t>café</t>");
///
/// let text = normalize_encoding(b"<t>caf\xe9</t>", Some("text/xml; charset=iso-8859-1"));
/// assert_eq!(text, "<t>café</t>");
/// ```
pub fn normalize_encoding<'a>(bytes: &'a [u8], transport_hint: Option<&str>) -> Cow<'a, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        tracing::debug!(encoding = encoding.name(), "Decoding by byte-order mark");
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        // UTF-16 declarations can only be read once decoded
        let (_, rest) = split_declaration(text.as_bytes());
        return Cow::Owned(String::from_utf8_lossy(rest).into_owned());
    }

    let (declared, rest) = split_declaration(bytes);
    let transport = transport_hint.and_then(charset_label);
    tracing::debug!(
        declared = declared.as_deref().unwrap_or("-"),
        transport = transport.unwrap_or("-"),
        "Normalizing document encoding"
    );

    let encoding = match declared.as_deref().or(transport) {
        Some(label) => match Encoding::for_label(label.as_bytes()) {
            // A readable ASCII declaration rules out UTF-16, so take the
            // ASCII-compatible output encoding
            Some(encoding) => encoding.output_encoding(),
            None => {
                tracing::debug!(label, "Unknown encoding label, assuming UTF-8");
                UTF_8
            }
        },
        None => UTF_8,
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(rest);
    if had_errors {
        tracing::debug!(
            encoding = encoding.name(),
            "Replaced malformed byte sequences"
        );
    }
    text
}

/// Splits a leading XML declaration off `bytes`, returning its encoding
/// label and the remaining input.
fn split_declaration(bytes: &[u8]) -> (Option<String>, &[u8]) {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let body = &bytes[start..];

    // `<?xml-stylesheet` and friends are processing instructions, not declarations
    let is_declaration = body.starts_with(b"<?xml")
        && matches!(body.get(5), Some(b) if b.is_ascii_whitespace() || *b == b'?');
    if !is_declaration {
        return (None, bytes);
    }

    let mut reader = Reader::from_reader(body);
    match reader.read_event() {
        Ok(Event::Decl(decl)) => {
            let encoding = decl
                .encoding()
                .and_then(Result::ok)
                .map(|label| String::from_utf8_lossy(&label).trim().to_owned())
                .filter(|label| !label.is_empty());
            let end = (reader.buffer_position() as usize).min(body.len());
            (encoding, &body[end..])
        }
        _ => (None, bytes),
    }
}

/// Extracts the encoding label from a transport hint.
fn charset_label(hint: &str) -> Option<&str> {
    let lower = hint.to_ascii_lowercase();
    let label = match lower.find("charset=") {
        Some(idx) => {
            let value = &hint[idx + "charset=".len()..];
            value.split(';').next().unwrap_or(value)
        }
        None if hint.contains('/') => return None,
        None => hint,
    };
    let label = label.trim().trim_matches(|c| c == '"' || c == '\'');
    (!label.is_empty()).then_some(label)
}
