//! Canonical forms of the request parts that go into the signature.

use std::collections::BTreeMap;
use std::fmt::Write;
use url::Url;

/// Percent-encodes `input` with the RFC 3986 unreserved set.
///
/// `A-Z a-z 0-9 - _ . ~` pass through, every other byte becomes `%XX`
/// with upper-case hex. A space is `%20`, never `+`.
pub fn uri_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// Returns the canonical query string of `url`.
///
/// Pairs are decoded, re-encoded with [`uri_encode`] and sorted by name,
/// then by value. A parameter without a value canonicalizes as `name=`.
pub fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| (uri_encode(&name), uri_encode(&value)))
        .collect();
    pairs.sort();

    let mut out = String::new();
    for (i, (name, value)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        out.push_str(name);
        out.push('=');
        out.push_str(value);
    }
    out
}

/// Returns the canonical path of `url`, as it appears on the wire.
pub(crate) fn canonical_path(url: &Url) -> &str {
    match url.path() {
        "" => "/",
        path => path,
    }
}

/// Returns the `host` header value for `url`, including a non-default port.
pub(crate) fn host_header(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Canonical header block and signed-headers list.
///
/// `headers` must already be keyed by lower-cased name with trimmed values;
/// the map's ordering is the lexicographic ordering the scheme requires.
pub(crate) fn canonical_headers(headers: &BTreeMap<String, String>) -> (String, String) {
    let mut block = String::new();
    let mut names = String::new();
    for (name, value) in headers {
        block.push_str(name);
        block.push(':');
        block.push_str(value);
        block.push('\n');

        if !names.is_empty() {
            names.push(';');
        }
        names.push_str(name);
    }
    (block, names)
}

/// Returns true if `name` is a valid HTTP header name (RFC 7230 token).
pub(crate) fn is_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

/// Returns true if `value` can be sent as a header value.
pub(crate) fn is_wire_safe(value: &str) -> bool {
    value.bytes().all(|b| b == b'\t' || (b' '..=b'~').contains(&b))
}
