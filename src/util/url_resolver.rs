use url::Url;

/// Returns `true` if the value is an absolute `http` or `https` URL with a host.
///
/// This is the structural validity check for candidates that are only
/// usable as links when they are already absolute, such as an RSS `guid`
/// standing in for a missing `link`.
///
/// # Examples
///
/// ```
/// use feednorm::util::is_absolute_http_url;
///
/// assert!(is_absolute_http_url("https://example.org/post/1"));
/// assert!(!is_absolute_http_url("/post/1"));
/// assert!(!is_absolute_http_url("urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a"));
/// assert!(!is_absolute_http_url("ftp://example.org/file"));
/// ```
pub fn is_absolute_http_url(value: &str) -> bool {
    match Url::parse(value.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Resolves `value` against `base`.
///
/// - An already absolute URL is returned verbatim (trimmed), so publisher
///   URLs are never re-encoded.
/// - A relative reference (path, query, protocol-relative) is joined onto
///   `base` when `base` parses.
/// - When nothing can be resolved the trimmed input is returned unchanged.
///
/// # Examples
///
/// ```
/// use feednorm::util::resolve_url;
///
/// assert_eq!(
///     resolve_url("/wiki/War_and_Peace", "https://feeds.example.org/category/x.xml"),
///     "https://feeds.example.org/wiki/War_and_Peace"
/// );
/// assert_eq!(
///     resolve_url("https://example.org/a", "https://other.example/"),
///     "https://example.org/a"
/// );
/// assert_eq!(resolve_url("post/1", ""), "post/1");
/// ```
pub fn resolve_url(value: &str, base: &str) -> String {
    let value = value.trim();

    if value.is_empty() || Url::parse(value).is_ok() {
        return value.to_owned();
    }

    match Url::parse(base.trim()).and_then(|base| base.join(value)) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            tracing::trace!(value, base, error = %e, "Leaving URL unresolved");
            value.to_owned()
        }
    }
}

/// Returns the origin of `value` as a URL ending in `/`.
///
/// Returns an empty string when the value is not an absolute URL with a host.
///
/// # Examples
///
/// ```
/// use feednorm::util::base_url;
///
/// assert_eq!(base_url("https://feeds.example.org/category/x.xml"), "https://feeds.example.org/");
/// assert_eq!(base_url("http://example.org:8080/rss?x=1"), "http://example.org:8080/");
/// assert_eq!(base_url(""), "");
/// ```
pub fn base_url(value: &str) -> String {
    let Ok(url) = Url::parse(value.trim()) else {
        return String::new();
    };
    let Some(host) = url.host_str() else {
        return String::new();
    };

    match url.port() {
        Some(port) => format!("{}://{}:{}/", url.scheme(), host, port),
        None => format!("{}://{}/", url.scheme(), host),
    }
}
