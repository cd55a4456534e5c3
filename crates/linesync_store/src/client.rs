//! Object-store client over signed HTTPS.

use crate::cache::ObjectCache;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::sniff::sniff_content_type;
use crate::store::ObjectStore;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
use chrono::Utc;
use linesync_sigv4::{uri_encode, Credentials, RequestSigner, SignableRequest};
use std::time::Instant;
use url::Url;

/// Connection to a real store: endpoint, signer and transport.
struct Remote {
    base: Url,
    signer: RequestSigner,
    transport: Box<dyn HttpTransport>,
}

/// An S3-style object store client.
///
/// Objects live at `https://{bucket}.{domain}/{key}`. Every request is
/// signed with [`RequestSigner`].
///
/// # Caching
///
/// Every `put` writes the local cache *before* the network write, so a
/// failed network write leaves the cache ahead of the store. The cache
/// answers `get` when no credentials are configured (no network calls at
/// all) and when the store cannot be reached.
pub struct ObjectStoreClient {
    remote: Option<Remote>,
    cache: ObjectCache,
}

impl ObjectStoreClient {
    /// Creates a client using a blocking `reqwest` transport.
    ///
    /// Must not be called from inside an async runtime when the
    /// configuration is remote.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        if !config.is_remote() {
            return Self::with_transport(config, NoTransport);
        }
        let transport = ReqwestTransport::new()?;
        Self::with_transport(config, transport)
    }

    /// Creates a client that sends requests through `transport`.
    ///
    /// The transport is unused when the configuration is not remote.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid.
    pub fn with_transport(
        config: StoreConfig,
        transport: impl HttpTransport + 'static,
    ) -> StoreResult<Self> {
        let remote = match (&config.credentials, config.is_remote()) {
            (Some(credentials), true) => Some(Remote::new(&config, credentials, transport)?),
            _ => None,
        };

        if remote.is_none() {
            tracing::info!("no store credentials configured, using in-memory cache only");
        }

        Ok(Self {
            remote,
            cache: ObjectCache::new(),
        })
    }

    /// Returns true if the client talks to a real store.
    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Returns the local cache.
    pub fn cache(&self) -> &ObjectCache {
        &self.cache
    }

    /// Returns the URL of `key`, or `None` for a cache-only client.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is empty.
    pub fn object_url(&self, key: &str) -> StoreResult<Option<Url>> {
        self.remote.as_ref().map(|r| r.object_url(key)).transpose()
    }
}

impl ObjectStore for ObjectStoreClient {
    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        let Some(remote) = &self.remote else {
            return Ok(self.cache.lookup(key).unwrap_or_default());
        };

        match remote.send(Method::Get, key, None, Vec::new()) {
            Ok(response) if response.is_ok() => Ok(response.body),
            Ok(response) if response.is_not_found() => {
                tracing::debug!(key, "object not found, treating as empty");
                Ok(Vec::new())
            }
            Ok(response) => Err(StoreError::status(response.status, &response.body)),
            Err(err) if err.is_transport() => match self.cache.lookup(key) {
                Some(cached) => {
                    tracing::warn!(key, error = %err, "store unreachable, serving cached copy");
                    Ok(cached)
                }
                None => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.cache.insert(key, value.to_vec());

        let Some(remote) = &self.remote else {
            return Ok(());
        };

        let content_type = sniff_content_type(value);
        let response = remote.send(Method::Put, key, Some(content_type), value.to_vec())?;
        if response.is_ok() {
            Ok(())
        } else {
            Err(StoreError::status(response.status, &response.body))
        }
    }
}

impl Remote {
    fn new(
        config: &StoreConfig,
        credentials: &Credentials,
        transport: impl HttpTransport + 'static,
    ) -> StoreResult<Self> {
        let endpoint = format!("https://{}.{}/", config.bucket, config.domain);
        let base = Url::parse(&endpoint)
            .map_err(|e| StoreError::Config(format!("bad endpoint {endpoint:?}: {e}")))?;

        Ok(Self {
            base,
            signer: RequestSigner::new(
                credentials.clone(),
                config.region.clone(),
                config.service.clone(),
            ),
            transport: Box::new(transport),
        })
    }

    fn object_url(&self, key: &str) -> StoreResult<Url> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let mut url = self.base.clone();
        url.set_path(&format!("/{}", uri_encode(key)));
        Ok(url)
    }

    fn send(
        &self,
        method: Method,
        key: &str,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> StoreResult<HttpResponse> {
        let url = self.object_url(key)?;

        let signed = {
            let mut signable = SignableRequest::new(method.as_str(), &url).with_body(&body);
            if let Some(content_type) = content_type {
                signable = signable.with_header("content-type", content_type);
            }
            self.signer.sign(&signable, Utc::now())?
        };

        let request = HttpRequest {
            method,
            url,
            headers: signed.into_headers(),
            body,
        };

        let start = Instant::now();
        let result = self.transport.execute(request);
        match &result {
            Ok(response) => tracing::debug!(
                %method,
                key,
                status = response.status,
                elapsed = ?start.elapsed(),
                "store request"
            ),
            Err(err) => tracing::debug!(
                %method,
                key,
                error = %err,
                elapsed = ?start.elapsed(),
                "store request failed"
            ),
        }
        result
    }
}

/// Transport for cache-only clients; never called.
struct NoTransport;

impl HttpTransport for NoTransport {
    fn execute(&self, _request: HttpRequest) -> StoreResult<HttpResponse> {
        Err(StoreError::Transport("no store configured".into()))
    }
}
