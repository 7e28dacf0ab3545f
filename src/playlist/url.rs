//! Base URL derivation and reference resolution.

use tracing::debug;
use url::Url;

/// Scheme-and-host part of `url`, e.g. `https://example.com:8443`.
///
/// Returns `None` when `url` does not parse or has an opaque origin.
pub fn origin(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let origin = parsed.origin();
    if !origin.is_tuple() {
        return None;
    }
    Some(origin.ascii_serialization())
}

/// Whether `s` is an absolute http(s) URL.
pub fn is_absolute_http(s: &str) -> bool {
    regex!(r"(?i)^https?://.+").is_match(s)
}

/// Directory of the resource at `url`, always ending in `/`.
///
/// `https://h/a/b/c.m3u8` becomes `https://h/a/b/`. A URL with at most one
/// path segment maps to the origin root.
pub fn derive_base_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if parsed.origin().is_tuple() => {
            let origin = parsed.origin().ascii_serialization();
            let mut segments: Vec<&str> = parsed
                .path()
                .split('/')
                .filter(|s| !s.is_empty())
                .collect();
            if segments.len() <= 1 {
                return format!("{}/", origin);
            }
            segments.pop();
            format!("{}/{}/", origin, segments.join("/"))
        }
        _ => {
            debug!("Failed to parse URL for base derivation: {:?}", url);
            textual_base(url)
        }
    }
}

// Cut after the last '/' that is not part of the scheme separator.
fn textual_base(url: &str) -> String {
    let floor = url.find("://").map(|i| i + 3).unwrap_or(0);
    match url.rfind('/') {
        Some(i) if i >= floor => url[..=i].to_string(),
        _ => format!("{}/", url),
    }
}

/// Resolve `relative` against the directory URL `base`.
///
/// Absolute http(s) references are returned untouched, root-relative ones
/// are joined with the origin of `base`, anything else is appended to the
/// directory. A malformed `base` degrades to plain concatenation.
pub fn resolve_url(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return String::new();
    }
    if is_absolute_http(relative) {
        return relative.to_string();
    }
    if base.is_empty() {
        return relative.to_string();
    }

    if relative.starts_with("//") {
        return resolve_network_path(base, relative);
    }

    if relative.starts_with('/') {
        return match origin(base) {
            Some(origin) => format!("{}{}", origin, relative),
            None => {
                debug!(
                    "Cannot extract origin from base {:?}, concatenating {:?}",
                    base, relative
                );
                format!("{}{}", base.trim_end_matches('/'), relative)
            }
        };
    }

    match base.rfind('/') {
        Some(i) if i == base.len() - 1 => format!("{}{}", base, relative),
        Some(i) if i >= base.find("://").map(|s| s + 3).unwrap_or(0) => {
            format!("{}{}", &base[..=i], relative)
        }
        _ => format!("{}/{}", base, relative),
    }
}

// `//host/path` takes the scheme of `base`.
fn resolve_network_path(base: &str, relative: &str) -> String {
    if let Ok(joined) = Url::parse(base).and_then(|b| b.join(relative)) {
        return joined.to_string();
    }
    let scheme = base.split_once("://").map(|(s, _)| s).unwrap_or("https");
    debug!(
        "Cannot join {:?} onto base {:?}, assuming scheme {}",
        relative, base, scheme
    );
    format!("{}:{}", scheme, relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_base_url() {
        assert_eq!(derive_base_url("https://h/a/b/c.m3u8"), "https://h/a/b/");
        assert_eq!(derive_base_url("https://h/c.m3u8"), "https://h/");
        assert_eq!(derive_base_url("https://h/"), "https://h/");
        assert_eq!(derive_base_url("https://h"), "https://h/");
    }

    #[test]
    fn test_derive_base_url_drops_query_and_keeps_port() {
        assert_eq!(
            derive_base_url("http://h:8080/live/x/index.m3u8?token=abc"),
            "http://h:8080/live/x/"
        );
    }

    #[test]
    fn test_derive_base_url_fallback() {
        assert_eq!(derive_base_url("not a url/path/file"), "not a url/path/");
        assert_eq!(derive_base_url("nourl"), "nourl/");
        assert_eq!(derive_base_url("http://"), "http:///");
    }

    #[test]
    fn test_resolve_absolute_ignores_base() {
        let abs = "https://cdn.example.com/x/seg1.ts";
        assert_eq!(resolve_url("https://h/a/", abs), abs);
        assert_eq!(resolve_url("garbage", abs), abs);
        assert_eq!(resolve_url("", abs), abs);
        assert_eq!(resolve_url("https://h/a/", "HTTP://H/x.ts"), "HTTP://H/x.ts");
    }

    #[test]
    fn test_resolve_root_relative() {
        assert_eq!(
            resolve_url("https://h:444/a/b/", "/key/k.bin"),
            "https://h:444/key/k.bin"
        );
        assert_eq!(resolve_url("https://h/a/", "/x.ts?y=1"), "https://h/x.ts?y=1");
    }

    #[test]
    fn test_resolve_network_path() {
        assert_eq!(
            resolve_url("https://h/a/", "//cdn.example.com/seg0.ts"),
            "https://cdn.example.com/seg0.ts"
        );
        assert_eq!(
            resolve_url("http://h:81/a/", "//cdn.example.com/k.bin?t=1"),
            "http://cdn.example.com/k.bin?t=1"
        );
        assert_eq!(
            resolve_url("foo/bar/", "//cdn.example.com/seg0.ts"),
            "https://cdn.example.com/seg0.ts"
        );
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve_url("https://h/a/", "seg1.ts"), "https://h/a/seg1.ts");
        assert_eq!(
            resolve_url("https://h/a/", "sub/720p.m3u8?x=1"),
            "https://h/a/sub/720p.m3u8?x=1"
        );
        assert_eq!(resolve_url("https://h/a/", ""), "");
    }

    #[test]
    fn test_resolve_malformed_base() {
        assert_eq!(resolve_url("foo/bar/", "seg.ts"), "foo/bar/seg.ts");
        assert_eq!(resolve_url("foo/bar/", "/seg.ts"), "foo/bar/seg.ts");
        assert_eq!(resolve_url("https://h/a/index", "seg.ts"), "https://h/a/seg.ts");
    }

    #[test]
    fn test_origin() {
        assert_eq!(origin("https://h/a/b"), Some("https://h".to_string()));
        assert_eq!(origin("http://h:81/"), Some("http://h:81".to_string()));
        assert_eq!(origin("data:text/plain,hi"), None);
        assert_eq!(origin("nope"), None);
    }
}
