use url::Url;

/// Extracts the rate-limiting domain from a URL
///
/// The host is lowercased. An explicit non-default port stays part of the
/// key, so two servers on one host with different ports are paced
/// independently.
///
/// # Arguments
///
/// * `url` - The URL to extract the domain from
///
/// # Returns
///
/// * `Some(String)` - The lowercase host, with `:port` when one is given
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use metacrawl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:3000/").unwrap();
/// assert_eq!(extract_domain(&url), Some("127.0.0.1:3000".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}
