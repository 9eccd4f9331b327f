use std::borrow::Cow;

use encoding_rs::WINDOWS_1252;
use html_escape::decode_html_entities;

use crate::util::{is_xml_char, strip_invalid_xml_chars};

/// Longest entity name worth looking up.
const MAX_REFERENCE_LEN: usize = 32;

/// Applies the recovery heuristics for documents that failed a strict parse.
///
/// - Characters XML forbids are removed
/// - Anything before the first `<` is dropped
/// - HTML named entities become numeric references
/// - Numeric references in the C1 range (128-159) are read as Windows-1252,
///   which is what the publisher almost always meant
/// - References to code points XML forbids are dropped
/// - Any other `&` is escaped
///
/// CDATA sections and comments are copied verbatim.
///
/// # Examples
///
/// ```
/// use feednorm::xml::repair;
///
/// assert_eq!(repair("junk<t>a&nbsp;b &#150; Q&A</t>"), "<t>a&#160;b &#8211; Q&amp;A</t>");
/// assert_eq!(repair("<t>ok &amp; fine</t>"), "<t>ok &amp; fine</t>");
/// ```
pub fn repair(text: &str) -> Cow<'_, str> {
    let stripped = strip_invalid_xml_chars(text);
    let start = stripped.find('<').unwrap_or(stripped.len());

    if !stripped[start..].contains('&') {
        return match stripped {
            Cow::Borrowed(s) => Cow::Borrowed(&s[start..]),
            Cow::Owned(s) => Cow::Owned(s[start..].to_owned()),
        };
    }

    Cow::Owned(fix_references(&stripped[start..]))
}

fn fix_references(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(['&', '<']) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if rest.starts_with('<') {
            let (copied, after) = verbatim_section(rest).unwrap_or(rest.split_at(1));
            out.push_str(copied);
            rest = after;
            continue;
        }

        let consumed = rewrite_reference(rest, &mut out);
        rest = &rest[consumed..];
    }

    out.push_str(rest);
    out
}

/// Splits off a CDATA section or comment at the start of `s`, if any.
/// An unterminated section runs to the end of input.
fn verbatim_section(s: &str) -> Option<(&str, &str)> {
    for (open, close) in [("<![CDATA[", "]]>"), ("<!--", "-->")] {
        if let Some(body) = s.strip_prefix(open) {
            let end = body
                .find(close)
                .map_or(s.len(), |idx| open.len() + idx + close.len());
            return Some(s.split_at(end));
        }
    }
    None
}

/// Rewrites the reference starting at the `&` that begins `s`, returning
/// how many bytes of `s` were consumed.
fn rewrite_reference(s: &str, out: &mut String) -> usize {
    let body = &s[1..];
    let name_len = body
        .bytes()
        .take(MAX_REFERENCE_LEN)
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'#')
        .count();

    if name_len == 0 || body.as_bytes().get(name_len) != Some(&b';') {
        out.push_str("&amp;");
        return 1;
    }

    let name = &body[..name_len];
    let consumed = name_len + 2;

    if let Some(number) = name.strip_prefix('#') {
        match parse_char_ref(number) {
            Some(code) if (0x80..=0x9f).contains(&code) => {
                let byte = [code as u8];
                let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(&byte);
                for c in decoded.chars() {
                    out.push_str(&format!("&#{};", c as u32));
                }
            }
            Some(code) if char::from_u32(code).is_some_and(is_xml_char) => {
                out.push_str(&s[..consumed]);
            }
            // Unrepresentable code point
            Some(_) => {}
            None => {
                out.push_str("&amp;");
                return 1;
            }
        }
        return consumed;
    }

    if matches!(name, "lt" | "gt" | "amp" | "quot" | "apos") {
        out.push_str(&s[..consumed]);
    } else if let Some(references) = html_entity(name) {
        out.push_str(&references);
    } else {
        out.push_str("&amp;");
        return 1;
    }
    consumed
}

fn parse_char_ref(number: &str) -> Option<u32> {
    match number.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => number.parse().ok(),
    }
}

/// Numeric references for the HTML named entity `name`, if it is one.
fn html_entity(name: &str) -> Option<String> {
    let reference = format!("&{};", name);
    let decoded = decode_html_entities(&reference);
    // HTML entities expand to at most two code points; longer output means
    // only a legacy prefix such as `&not` matched
    if decoded.as_ref() == reference.as_str() || decoded.chars().count() > 2 {
        return None;
    }
    Some(
        decoded
            .chars()
            .filter(|c| is_xml_char(*c))
            .map(|c| format!("&#{};", c as u32))
            .collect(),
    )
}
