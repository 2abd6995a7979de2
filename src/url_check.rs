use url::Url;

const KNOWN_SCHEMES: &[&str] = &[
    "http", "https", "ftp", "ftps", "ws", "wss", "file", "mailto", "tel", "data",
];

// Schemes whose URLs must be written with an authority (`scheme://host`).
const AUTHORITY_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps", "ws", "wss"];
// Schemes written as `scheme://` whose host may be empty.
const HIERARCHICAL_SCHEMES: &[&str] = &["file"];

/// Returns true if `input` is an absolute URL with a recognized scheme.
///
/// The WHATWG parser repairs inputs such as `https:/example.com` into a
/// valid URL; those are rejected here by requiring the literal `//` after
/// the scheme for schemes that carry a host. Opaque schemes such as
/// `mailto:` need a non-empty body.
pub fn is_valid_url(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.len() != input.len() {
        return false;
    }

    let Ok(url) = Url::parse(input) else {
        return false;
    };

    let scheme = url.scheme();
    if !KNOWN_SCHEMES.contains(&scheme) {
        return false;
    }

    let has_slashes = input[scheme.len() + 1..].starts_with("//");
    if AUTHORITY_SCHEMES.contains(&scheme) {
        return has_slashes && url.host_str().is_some_and(|host| !host.is_empty());
    }
    if HIERARCHICAL_SCHEMES.contains(&scheme) {
        return has_slashes;
    }

    !url.path().is_empty()
}
