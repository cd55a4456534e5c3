//! Object store configuration.

use linesync_sigv4::Credentials;

/// Default store domain; buckets are addressed as `{bucket}.{domain}`.
pub const DEFAULT_DOMAIN: &str = "s3.amazonaws.com";

/// Default signing region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default signing service.
pub const DEFAULT_SERVICE: &str = "s3";

/// Configuration for an [`ObjectStoreClient`](crate::ObjectStoreClient).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Bucket name.
    pub bucket: String,
    /// Store domain.
    pub domain: String,
    /// Signing region.
    pub region: String,
    /// Signing service.
    pub service: String,
    /// Access credentials. Without them the client only uses its cache.
    pub credentials: Option<Credentials>,
}

impl StoreConfig {
    /// Creates a configuration for `bucket` with default domain, region and service.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            domain: DEFAULT_DOMAIN.to_string(),
            region: DEFAULT_REGION.to_string(),
            service: DEFAULT_SERVICE.to_string(),
            credentials: None,
        }
    }

    /// Creates a cache-only configuration.
    pub fn local() -> Self {
        Self::new("")
    }

    /// Sets the store domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Sets the signing region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets the signing service.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Sets the access credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Returns true if the configuration reaches a real store: a bucket and a
    /// complete credential pair are present.
    pub fn is_remote(&self) -> bool {
        !self.bucket.is_empty()
            && self
                .credentials
                .as_ref()
                .is_some_and(Credentials::is_complete)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_local() {
        let config = StoreConfig::default();
        assert!(!config.is_remote());
        assert_eq!(config.domain, "s3.amazonaws.com");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.service, "s3");
    }

    #[test]
    fn config_builder() {
        let config = StoreConfig::new("notes")
            .with_domain("objects.example.com")
            .with_region("eu-west-1")
            .with_credentials(Credentials::new("AKID", "secret"));

        assert_eq!(config.bucket, "notes");
        assert_eq!(config.domain, "objects.example.com");
        assert_eq!(config.region, "eu-west-1");
        assert!(config.is_remote());
    }

    #[test]
    fn remote_needs_bucket_and_both_keys() {
        assert!(!StoreConfig::new("notes").is_remote());
        assert!(!StoreConfig::new("notes")
            .with_credentials(Credentials::new("AKID", ""))
            .is_remote());
        assert!(!StoreConfig::local()
            .with_credentials(Credentials::new("AKID", "secret"))
            .is_remote());
    }
}
