//! Server configuration.

use crate::coordinator::LockStrategy;
use clap::Parser;
use linesync_store::{Credentials, StoreConfig, DEFAULT_DOMAIN, DEFAULT_REGION};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8888;

/// Configuration for the sync server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// How sync cycles are serialized.
    pub lock_strategy: LockStrategy,
    /// Directory to serve the static pages from instead of the bundled copies.
    pub assets_dir: Option<PathBuf>,
    /// Object store settings.
    pub store: StoreConfig,
}

impl ServerConfig {
    /// Creates a new server configuration with a cache-only store.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            lock_strategy: LockStrategy::Global,
            assets_dir: None,
            store: StoreConfig::local(),
        }
    }

    /// Sets the lock strategy.
    pub fn with_lock_strategy(mut self, strategy: LockStrategy) -> Self {
        self.lock_strategy = strategy;
        self
    }

    /// Serves static pages from `dir`.
    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = Some(dir.into());
        self
    }

    /// Sets the object store configuration.
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT))
    }
}

/// Command line and environment settings.
#[derive(Debug, Parser)]
#[command(name = "linesync")]
#[command(author, version, about = "Per-user append-only log sync server", long_about = None)]
pub struct CliArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind to
    #[arg(long, env = "BIND_ADDR", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Bucket holding the logs; without it logs live in memory only
    #[arg(long, env = "AWS_BUCKET", default_value = "")]
    pub bucket: String,

    /// Store access key id
    #[arg(long, env = "AWS_ACCESS_KEY", default_value = "", hide_env_values = true)]
    pub access_key: String,

    /// Store secret key
    #[arg(long, env = "AWS_SECRET_KEY", default_value = "", hide_env_values = true)]
    pub secret_key: String,

    /// Signing region
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Store domain; buckets are addressed as {bucket}.{domain}
    #[arg(long = "store-domain", env = "STORE_DOMAIN", default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    /// Serve index.html, sw.js and app.webmanifest from this directory
    #[arg(long, env = "ASSETS_DIR")]
    pub assets_dir: Option<PathBuf>,

    /// How sync cycles are serialized
    #[arg(long, value_enum, default_value_t = LockStrategy::Global)]
    pub lock_strategy: LockStrategy,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<&CliArgs> for ServerConfig {
    fn from(args: &CliArgs) -> Self {
        let store = StoreConfig::new(args.bucket.clone())
            .with_domain(args.domain.clone())
            .with_region(args.region.clone())
            .with_credentials(Credentials::new(
                args.access_key.clone(),
                args.secret_key.clone(),
            ));

        let mut config = ServerConfig::new(SocketAddr::new(args.bind, args.port))
            .with_lock_strategy(args.lock_strategy)
            .with_store(store);
        config.assets_dir = args.assets_dir.clone();
        config
    }
}
