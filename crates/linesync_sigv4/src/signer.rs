//! Request signer.

use crate::canonical::{
    canonical_headers, canonical_path, canonical_query, host_header, is_token, is_wire_safe,
};
use crate::credentials::Credentials;
use crate::error::{SigningError, SigningResult};
use crate::key::{derive_signing_key, hash_payload, SCOPE_TERMINATOR};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use url::Url;

/// Signature algorithm identifier.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const SCOPE_DATE_FORMAT: &str = "%Y%m%d";

const HOST: &str = "host";
const X_AMZ_DATE: &str = "x-amz-date";
const X_AMZ_CONTENT_SHA256: &str = "x-amz-content-sha256";

/// A request to be signed.
#[derive(Debug, Clone)]
pub struct SignableRequest<'a> {
    /// HTTP method.
    pub method: &'a str,
    /// Full request URL.
    pub url: &'a Url,
    /// Extra headers to sign and send, in addition to the mandatory ones.
    pub headers: Vec<(&'a str, &'a str)>,
    /// Request body.
    pub body: &'a [u8],
}

impl<'a> SignableRequest<'a> {
    /// Creates a bodiless request with no extra headers.
    pub fn new(method: &'a str, url: &'a Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: &[],
        }
    }

    /// Adds an extra header.
    pub fn with_header(mut self, name: &'a str, value: &'a str) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: &'a [u8]) -> Self {
        self.body = body;
        self
    }
}

/// The result of signing a request.
///
/// Carries every header that must accompany the request, plus the
/// intermediate strings of the algorithm for diagnostics.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    headers: Vec<(String, String)>,
    authorization: String,
    signed_headers: String,
    canonical_request: String,
    string_to_sign: String,
    signature: String,
}

impl SignedRequest {
    /// All headers to send, lower-cased, `authorization` last.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Consumes the result and returns the headers to send.
    pub fn into_headers(self) -> Vec<(String, String)> {
        self.headers
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    /// Semicolon-joined sorted list of signed header names.
    pub fn signed_headers(&self) -> &str {
        &self.signed_headers
    }

    /// The canonical request that was hashed.
    pub fn canonical_request(&self) -> &str {
        &self.canonical_request
    }

    /// The string that was signed.
    pub fn string_to_sign(&self) -> &str {
        &self.string_to_sign
    }

    /// Hex signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

/// Signs requests for one region and service with a fixed credential pair.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
    region: String,
    service: String,
}

impl RequestSigner {
    /// Creates a signer.
    pub fn new(
        credentials: Credentials,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
        }
    }

    /// Returns the region requests are scoped to.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Returns the service requests are scoped to.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the credential scope for `time`: `date/region/service/aws4_request`.
    pub fn credential_scope(&self, time: DateTime<Utc>) -> String {
        format!(
            "{}/{}/{}/{}",
            time.format(SCOPE_DATE_FORMAT),
            self.region,
            self.service,
            SCOPE_TERMINATOR
        )
    }

    /// Signs `request` as of `time`.
    ///
    /// Header names are lower-cased and values trimmed, both for the
    /// canonical form and for the returned wire headers. An extra header
    /// named like a mandatory one replaces the mandatory value.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no host, or a header name or value
    /// cannot be sent.
    pub fn sign(
        &self,
        request: &SignableRequest<'_>,
        time: DateTime<Utc>,
    ) -> SigningResult<SignedRequest> {
        let host = host_header(request.url)
            .ok_or_else(|| SigningError::MissingHost(request.url.to_string()))?;
        let amz_date = time.format(AMZ_DATE_FORMAT).to_string();

        let mut headers = BTreeMap::new();
        headers.insert(HOST.to_string(), host);
        headers.insert(X_AMZ_DATE.to_string(), amz_date.clone());
        headers.insert(X_AMZ_CONTENT_SHA256.to_string(), hash_payload(request.body));
        for (name, value) in &request.headers {
            let name = name.trim().to_ascii_lowercase();
            if !is_token(&name) {
                return Err(SigningError::InvalidHeaderName(name));
            }
            let value = value.trim();
            if !is_wire_safe(value) {
                return Err(SigningError::InvalidHeaderValue { name });
            }
            headers.insert(name, value.to_string());
        }

        let payload_hash = headers
            .get(X_AMZ_CONTENT_SHA256)
            .cloned()
            .unwrap_or_default();
        let (canonical_block, signed_headers) = canonical_headers(&headers);

        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            request.method.to_ascii_uppercase(),
            canonical_path(request.url),
            canonical_query(request.url),
            canonical_block,
            signed_headers,
            payload_hash
        );

        let scope = self.credential_scope(time);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            hash_payload(canonical_request.as_bytes())
        );

        let key = derive_signing_key(
            self.credentials.secret_key(),
            &time.format(SCOPE_DATE_FORMAT).to_string(),
            &self.region,
            &self.service,
        );
        let signature = key.sign(&string_to_sign);

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM,
            self.credentials.access_key(),
            scope,
            signed_headers,
            signature
        );

        let mut wire: Vec<(String, String)> = headers.into_iter().collect();
        wire.push(("authorization".to_string(), authorization.clone()));

        Ok(SignedRequest {
            headers: wire,
            authorization,
            signed_headers,
            canonical_request,
            string_to_sign,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn signer() -> RequestSigner {
        RequestSigner::new(Credentials::new("AKID", "secret"), "us-east-1", "s3")
    }

    fn time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 17, 5, 1).unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn mandatory_headers_present() {
        let u = url("https://bucket.s3.amazonaws.com/alice");
        let signed = signer().sign(&SignableRequest::new("GET", &u), time()).unwrap();

        let names: Vec<&str> = signed.headers().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            ["host", "x-amz-content-sha256", "x-amz-date", "authorization"]
        );
        assert_eq!(signed.signed_headers(), "host;x-amz-content-sha256;x-amz-date");
        assert_eq!(signed.headers()[0].1, "bucket.s3.amazonaws.com");
        assert_eq!(signed.headers()[2].1, "20240309T170501Z");
    }

    #[test]
    fn canonical_request_layout() {
        let u = url("https://bucket.s3.amazonaws.com/alice");
        let request = SignableRequest::new("put", &u)
            .with_header("Content-Type", "  text/plain; charset=utf-8 ")
            .with_body(b"a\n");
        let signed = signer().sign(&request, time()).unwrap();

        let expected = format!(
            "PUT\n/alice\n\ncontent-type:text/plain; charset=utf-8\nhost:bucket.s3.amazonaws.com\nx-amz-content-sha256:{hash}\nx-amz-date:20240309T170501Z\n\ncontent-type;host;x-amz-content-sha256;x-amz-date\n{hash}",
            hash = hash_payload(b"a\n")
        );
        assert_eq!(signed.canonical_request(), expected);
    }

    #[test]
    fn string_to_sign_layout() {
        let u = url("https://bucket.s3.amazonaws.com/alice");
        let signed = signer().sign(&SignableRequest::new("GET", &u), time()).unwrap();

        let lines: Vec<&str> = signed.string_to_sign().split('\n').collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], ALGORITHM);
        assert_eq!(lines[1], "20240309T170501Z");
        assert_eq!(lines[2], "20240309/us-east-1/s3/aws4_request");
        assert_eq!(lines[3], hash_payload(signed.canonical_request().as_bytes()));
    }

    #[test]
    fn authorization_layout() {
        let u = url("https://bucket.s3.amazonaws.com/alice");
        let signed = signer().sign(&SignableRequest::new("GET", &u), time()).unwrap();

        assert_eq!(
            signed.authorization(),
            format!(
                "AWS4-HMAC-SHA256 Credential=AKID/20240309/us-east-1/s3/aws4_request, SignedHeaders=host;x-amz-content-sha256;x-amz-date, Signature={}",
                signed.signature()
            )
        );
        assert_eq!(signed.signature().len(), 64);
    }

    #[test]
    fn extra_header_overrides_mandatory() {
        let u = url("https://bucket.s3.amazonaws.com/alice");
        let request =
            SignableRequest::new("GET", &u).with_header("X-Amz-Content-Sha256", "UNSIGNED-PAYLOAD");
        let signed = signer().sign(&request, time()).unwrap();

        assert_eq!(signed.signed_headers(), "host;x-amz-content-sha256;x-amz-date");
        assert!(signed.canonical_request().ends_with("\nUNSIGNED-PAYLOAD"));
    }

    #[test]
    fn rejects_url_without_host() {
        let u = url("file:///tmp/x");
        let err = signer().sign(&SignableRequest::new("GET", &u), time()).unwrap_err();
        assert!(matches!(err, SigningError::MissingHost(_)));
    }

    #[test]
    fn rejects_bad_header() {
        let u = url("https://h/");
        let err = signer()
            .sign(&SignableRequest::new("GET", &u).with_header("bad name", "v"), time())
            .unwrap_err();
        assert!(matches!(err, SigningError::InvalidHeaderName(_)));

        let err = signer()
            .sign(&SignableRequest::new("GET", &u).with_header("x-a", "v\r\nx"), time())
            .unwrap_err();
        assert!(matches!(err, SigningError::InvalidHeaderValue { .. }));
    }

    #[test]
    fn deterministic() {
        let u = url("https://bucket.s3.amazonaws.com/alice?b=2&a=1");
        let request = SignableRequest::new("GET", &u);
        let a = signer().sign(&request, time()).unwrap();
        let b = signer().sign(&request, time()).unwrap();
        assert_eq!(a.authorization(), b.authorization());
    }
}
