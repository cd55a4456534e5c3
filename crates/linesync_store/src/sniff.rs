//! Content-type sniffing for uploaded blobs.
//!
//! A subset of the WHATWG MIME sniffing rules: enough to label text logs
//! correctly and to keep common binary formats from being sent as text.

/// Fallback content type.
pub const OCTET_STREAM: &str = "application/octet-stream";

const TEXT_UTF8: &str = "text/plain; charset=utf-8";
const HTML_UTF8: &str = "text/html; charset=utf-8";

/// Bytes examined when sniffing.
const SNIFF_LEN: usize = 512;

/// Tags that identify HTML when found at the start of the (whitespace
/// trimmed) content, followed by a space or `>`.
const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

/// Exact leading signatures.
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"\xFE\xFF", "text/plain; charset=utf-16be"),
    (b"\xFF\xFE", "text/plain; charset=utf-16le"),
    (b"\xEF\xBB\xBF", TEXT_UTF8),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"\x89PNG\r\n\x1A\n", "image/png"),
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b"\x1F\x8B\x08", "application/x-gzip"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x00\x00\x01\x00", "image/x-icon"),
];

/// Guesses the content type of `data`.
///
/// Returns [`OCTET_STREAM`] when nothing more specific applies. Empty input
/// is treated as text.
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];

    let trimmed = trim_leading_whitespace(data);
    if HTML_TAGS.iter().any(|tag| matches_html_tag(trimmed, tag)) {
        return HTML_UTF8;
    }
    if starts_with_ignore_case(trimmed, b"<?xml") {
        return "text/xml; charset=utf-8";
    }

    if let Some((_, content_type)) = SIGNATURES.iter().find(|(sig, _)| data.starts_with(sig)) {
        return *content_type;
    }
    if data.len() >= 14 && data.starts_with(b"RIFF") && &data[8..14] == b"WEBPVP" {
        return "image/webp";
    }

    if data.iter().copied().any(is_binary_byte) {
        OCTET_STREAM
    } else {
        TEXT_UTF8
    }
}

fn trim_leading_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

fn starts_with_ignore_case(data: &[u8], prefix: &[u8]) -> bool {
    data.len() >= prefix.len() && data[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn matches_html_tag(data: &[u8], tag: &[u8]) -> bool {
    starts_with_ignore_case(data, tag) && matches!(data.get(tag.len()), Some(b' ' | b'>'))
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_text() {
        assert_eq!(sniff_content_type(b""), "text/plain; charset=utf-8");
    }

    #[test]
    fn log_lines_are_text() {
        assert_eq!(
            sniff_content_type(b"buy milk\ncall bob\n"),
            "text/plain; charset=utf-8"
        );
        assert_eq!(
            sniff_content_type("caf\u{e9}\n".as_bytes()),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn html_detected_case_insensitively() {
        assert_eq!(sniff_content_type(b"  <html><body>"), "text/html; charset=utf-8");
        assert_eq!(sniff_content_type(b"<!doctype html>"), "text/html; charset=utf-8");
        // Tag must be terminated.
        assert_eq!(sniff_content_type(b"<applet"), "text/plain; charset=utf-8");
    }

    #[test]
    fn binary_signatures() {
        assert_eq!(sniff_content_type(b"\x89PNG\r\n\x1A\n\0\0"), "image/png");
        assert_eq!(sniff_content_type(b"%PDF-1.7"), "application/pdf");
        assert_eq!(sniff_content_type(b"\x1F\x8B\x08\0"), "application/x-gzip");
        assert_eq!(sniff_content_type(b"RIFF\0\0\0\0WEBPVP8 "), "image/webp");
    }

    #[test]
    fn control_bytes_fall_back_to_octet_stream() {
        assert_eq!(sniff_content_type(b"a\x00b"), OCTET_STREAM);
        assert_eq!(sniff_content_type(b"\x01\x02\x03"), OCTET_STREAM);
    }

    #[test]
    fn only_prefix_is_examined() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0);
        assert_eq!(sniff_content_type(&data), "text/plain; charset=utf-8");
    }
}
