//! Media playlist rewriting.
//!
//! Works line by line on the text; there is no structural parse. Key and
//! init-section tags get their first `URI="..."` attribute rewritten, every
//! segment line is replaced by its relay path, everything else is copied.

use tracing::debug;
use url::Url;

use super::proxy_path::to_proxy_path;
use super::url::{derive_base_url, resolve_url};

/// Rewrite all references in a media playlist fetched from `url`.
pub fn rewrite_media_playlist(url: &str, content: &str) -> String {
    let base_url = derive_base_url(url);
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let lines: Vec<&str> = content.split('\n').collect();
    let last = lines.len() - 1;
    let mut output = Vec::with_capacity(lines.len());

    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();

        if line.is_empty() {
            // Keep only the final empty line so the output still ends in '\n'.
            if i == last {
                output.push(String::new());
            }
            continue;
        }

        if line.starts_with("#EXT-X-KEY") {
            output.push(rewrite_uri_attribute(line, &base_url, "KEY"));
        } else if line.starts_with("#EXT-X-MAP") {
            output.push(rewrite_uri_attribute(line, &base_url, "MAP"));
        } else if line.starts_with('#') {
            output.push(line.to_string());
        } else if is_foreign_scheme(line) {
            debug!("Leaving segment with foreign scheme untouched: {:?}", line);
            output.push(line.to_string());
        } else {
            let absolute = resolve_url(&base_url, line);
            debug!("Rewriting segment: {:?} -> {:?}", line, absolute);
            output.push(to_proxy_path(&absolute));
        }
    }

    output.join("\n")
}

/// Rewrite the first `URI="..."` attribute of a tag line.
fn rewrite_uri_attribute(line: &str, base_url: &str, tag: &str) -> String {
    regex!(r#"URI="([^"]+)""#)
        .replacen(line, 1, |caps: &regex::Captures| {
            let uri = &caps[1];
            if is_foreign_scheme(uri) {
                debug!("Leaving {} URI with foreign scheme untouched: {:?}", tag, uri);
                return caps[0].to_string();
            }
            let absolute = resolve_url(base_url, uri);
            debug!("Rewriting {} URI: {:?} -> {:?}", tag, uri, absolute);
            format!("URI=\"{}\"", to_proxy_path(&absolute))
        })
        .into_owned()
}

// `skd://`, `data:` and friends cannot be fetched through the relay.
fn is_foreign_scheme(uri: &str) -> bool {
    match Url::parse(uri) {
        Ok(parsed) => !matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::to_proxy_path;

    #[test]
    fn test_key_line() {
        let input = "#EXTM3U\n#EXT-X-KEY:METHOD=AES-128,URI=\"key.bin\"\n#EXTINF:4,\nseg0.ts\n";
        let output = rewrite_media_playlist("https://h/a/index.m3u8", input);
        let expected_key = format!(
            "#EXT-X-KEY:METHOD=AES-128,URI=\"{}\"",
            to_proxy_path("https://h/a/key.bin")
        );
        let lines: Vec<&str> = output.split('\n').collect();
        assert_eq!(lines[1], expected_key);
        assert!(lines[1].starts_with("#EXT-X-KEY:METHOD=AES-128,URI=\"/proxy/"));
    }

    #[test]
    fn test_key_line_keeps_other_attributes() {
        let input = "#EXT-X-KEY:METHOD=AES-128,URI=\"/keys/k1\",IV=0x0123456789ABCDEF0123456789ABCDEF";
        let output = rewrite_media_playlist("https://h/a/index.m3u8", input);
        assert_eq!(
            output,
            format!(
                "#EXT-X-KEY:METHOD=AES-128,URI=\"{}\",IV=0x0123456789ABCDEF0123456789ABCDEF",
                to_proxy_path("https://h/keys/k1")
            )
        );
    }

    #[test]
    fn test_map_line() {
        let input = "#EXT-X-MAP:URI=\"init.mp4\",BYTERANGE=\"720@0\"";
        let output = rewrite_media_playlist("https://h/v/1080/prog.m3u8", input);
        assert_eq!(
            output,
            format!(
                "#EXT-X-MAP:URI=\"{}\",BYTERANGE=\"720@0\"",
                to_proxy_path("https://h/v/1080/init.mp4")
            )
        );
    }

    #[test]
    fn test_only_first_uri_rewritten() {
        let input = "#EXT-X-KEY:METHOD=SAMPLE-AES,URI=\"a.key\",KEYFORMAT=\"x\",URI=\"b.key\"";
        let output = rewrite_media_playlist("https://h/index.m3u8", input);
        assert!(output.contains(&to_proxy_path("https://h/a.key")));
        assert!(output.contains("URI=\"b.key\""));
    }

    #[test]
    fn test_key_line_without_uri() {
        let input = "#EXT-X-KEY:METHOD=NONE";
        assert_eq!(rewrite_media_playlist("https://h/i.m3u8", input), input);
    }

    #[test]
    fn test_foreign_scheme_key_untouched() {
        let input = "#EXT-X-KEY:METHOD=SAMPLE-AES,URI=\"skd://asset-id\",KEYFORMAT=\"com.apple.streamingkeydelivery\"";
        assert_eq!(rewrite_media_playlist("https://h/i.m3u8", input), input);
    }

    #[test]
    fn test_segments() {
        let input = "#EXTM3U\n#EXT-X-TARGETDURATION:4\n#EXTINF:4.0,\nseg0.ts\n#EXTINF:4.0,\nhttps://cdn.example.com/seg1.ts\n#EXTINF:4.0,\n/abs/seg2.ts\n#EXT-X-ENDLIST\n";
        let output = rewrite_media_playlist("https://h/live/index.m3u8?t=1", input);
        let expected = format!(
            "#EXTM3U\n#EXT-X-TARGETDURATION:4\n#EXTINF:4.0,\n{}\n#EXTINF:4.0,\n{}\n#EXTINF:4.0,\n{}\n#EXT-X-ENDLIST\n",
            to_proxy_path("https://h/live/seg0.ts"),
            to_proxy_path("https://cdn.example.com/seg1.ts"),
            to_proxy_path("https://h/abs/seg2.ts"),
        );
        assert_eq!(output, expected);
    }

    #[test]
    fn test_blank_lines() {
        let input = "#EXTM3U\n\n#EXTINF:4,\n\nseg0.ts\n\n#EXT-X-ENDLIST\n";
        let output = rewrite_media_playlist("https://h/index.m3u8", input);
        assert_eq!(
            output,
            format!(
                "#EXTM3U\n#EXTINF:4,\n{}\n#EXT-X-ENDLIST\n",
                to_proxy_path("https://h/seg0.ts")
            )
        );

        let no_trailing = "#EXTM3U\n#EXT-X-ENDLIST";
        assert_eq!(
            rewrite_media_playlist("https://h/index.m3u8", no_trailing),
            no_trailing
        );
    }

    #[test]
    fn test_crlf_normalized() {
        let input = "#EXTM3U\r\n#EXTINF:4,\r\nseg0.ts\r\n";
        let output = rewrite_media_playlist("https://h/index.m3u8", input);
        assert_eq!(
            output,
            format!("#EXTM3U\n#EXTINF:4,\n{}\n", to_proxy_path("https://h/seg0.ts"))
        );
    }

    #[test]
    fn test_comments_pass_through() {
        let input = "#EXTM3U\n# just a comment\n#EXT-X-PROGRAM-DATE-TIME:2024-01-01T00:00:00Z";
        assert_eq!(rewrite_media_playlist("https://h/index.m3u8", input), input);
    }

    #[test]
    fn test_byte_order_mark_dropped() {
        let input = "\u{feff}#EXTM3U\n#EXTINF:4,\nseg0.ts\n";
        let output = rewrite_media_playlist("https://h/a/index.m3u8", input);
        assert_eq!(
            output,
            format!("#EXTM3U\n#EXTINF:4,\n{}\n", to_proxy_path("https://h/a/seg0.ts"))
        );
    }

    #[test]
    fn test_foreign_scheme_segment_untouched() {
        let input = "#EXTM3U\n#EXTINF:4,\nskd://asset/seg0\n#EXTINF:4,\ndata:video/mp2t;base64,AAAA\n";
        assert_eq!(rewrite_media_playlist("https://h/a/index.m3u8", input), input);
    }

    #[test]
    fn test_network_path_segment() {
        let output = rewrite_media_playlist(
            "https://h/a/index.m3u8",
            "#EXTINF:4,\n//cdn.example.com/seg0.ts",
        );
        assert_eq!(
            output,
            format!(
                "#EXTINF:4,\n{}",
                to_proxy_path("https://cdn.example.com/seg0.ts")
            )
        );
    }
}
