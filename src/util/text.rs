use std::borrow::Cow;

/// Language prefixes written right-to-left.
const RTL_PREFIXES: &[&str] = &["ar", "fa", "ur", "ps", "syr", "dv", "he", "yi"];

/// Returns `true` if `c` may appear in an XML 1.0 document.
///
/// Rust `char` already excludes surrogates, so only the C0 controls
/// (other than tab, newline and carriage return) and the two
/// non-characters U+FFFE / U+FFFF are rejected.
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\u{9}' | '\u{A}' | '\u{D}')
        || ('\u{20}'..='\u{D7FF}').contains(&c)
        || ('\u{E000}'..='\u{FFFD}').contains(&c)
        || c >= '\u{10000}'
}

/// Removes characters that are not allowed in an XML 1.0 document.
///
/// Publishing platforms regularly leak raw control bytes (form feeds,
/// vertical tabs, stray NULs from bad database exports) into feed text.
/// A conforming XML parser rejects the whole document because of them,
/// so the repair pass drops them before retrying.
///
/// Preserves: tab (0x09), newline (0x0A), carriage return (0x0D).
///
/// Returns `Cow::Borrowed` when the input contains nothing to strip
/// (the common case).
///
/// # Examples
///
/// ```
/// use feednorm::util::strip_invalid_xml_chars;
///
/// assert_eq!(strip_invalid_xml_chars("clean\ttext"), "clean\ttext");
/// assert_eq!(strip_invalid_xml_chars("bad\u{0}\u{b}byte"), "badbyte");
/// ```
pub fn strip_invalid_xml_chars(s: &str) -> Cow<'_, str> {
    // Fast path: every disallowed char is either a C0 control (single byte)
    // or U+FFFE/U+FFFF (three bytes starting with 0xEF)
    let needs_strip = s
        .bytes()
        .any(|b| (b < 0x20 && b != 0x09 && b != 0x0a && b != 0x0d) || b == 0xef)
        && s.chars().any(|c| !is_xml_char(c));

    if !needs_strip {
        return Cow::Borrowed(s);
    }

    Cow::Owned(s.chars().filter(|&c| is_xml_char(c)).collect())
}

/// Returns `true` if the language tag denotes a right-to-left script.
///
/// Matching is by case-insensitive prefix, so regional variants such as
/// `ar-EG` or `he-IL` are covered.
///
/// # Examples
///
/// ```
/// use feednorm::util::is_rtl_language;
///
/// assert!(is_rtl_language("ur"));
/// assert!(is_rtl_language("AR-eg"));
/// assert!(!is_rtl_language("fr-FR"));
/// ```
pub fn is_rtl_language(language: &str) -> bool {
    let language = language.trim().to_ascii_lowercase();
    RTL_PREFIXES
        .iter()
        .any(|prefix| language.starts_with(prefix))
}
