use crate::UrlError;
use url::{Host, Url};

/// Checks that a submitted string is a fetchable URL
///
/// # Validation Rules
///
/// 1. Surrounding whitespace is ignored; inner whitespace is rejected
/// 2. A missing scheme is assumed to be `http://`
/// 3. Only HTTP and HTTPS schemes are accepted
/// 4. The host must be an IP literal, `localhost`, or a dotted domain name
///
/// # Arguments
///
/// * `raw` - The URL string as submitted
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL to fetch
/// * `Err(UrlError)` - The string is not a fetchable URL
///
/// # Examples
///
/// ```
/// use metacrawl::url::validate_url;
///
/// assert!(validate_url("https://example.com/page").is_ok());
/// assert_eq!(validate_url("example.com").unwrap().as_str(), "http://example.com/");
/// assert!(validate_url("not a url").is_err());
/// ```
pub fn validate_url(raw: &str) -> Result<Url, UrlError> {
    let candidate = raw.trim();

    if candidate.is_empty() {
        return Err(UrlError::Malformed("empty URL".to_string()));
    }

    if candidate.chars().any(char::is_whitespace) {
        return Err(UrlError::Malformed(format!(
            "URL contains whitespace: '{}'",
            candidate
        )));
    }

    let url = parse_with_default_scheme(candidate)?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host() {
        None => Err(UrlError::MissingDomain),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => Ok(url),
        Some(Host::Domain(domain)) => {
            if is_plausible_domain(domain) {
                Ok(url)
            } else {
                Err(UrlError::Malformed(format!("Invalid host: '{}'", domain)))
            }
        }
    }
}

/// Parses `candidate`, retrying with an `http://` prefix when it carries no
/// scheme of its own
fn parse_with_default_scheme(candidate: &str) -> Result<Url, UrlError> {
    let with_http = || {
        Url::parse(&format!("http://{}", candidate)).map_err(|e| UrlError::Parse(e.to_string()))
    };

    match Url::parse(candidate) {
        // "example.com:8080/path" parses with "example.com" as its scheme
        Ok(_) if !candidate.contains("://") && looks_like_host_and_port(candidate) => with_http(),
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => with_http(),
        Err(e) => Err(UrlError::Parse(e.to_string())),
    }
}

fn looks_like_host_and_port(candidate: &str) -> bool {
    candidate
        .split_once(':')
        .map(|(_, rest)| rest.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(false)
}

fn is_plausible_domain(domain: &str) -> bool {
    if domain == "localhost" {
        return true;
    }

    let domain = domain.strip_suffix('.').unwrap_or(domain);
    let labels: Vec<&str> = domain.split('.').collect();

    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        })
}
