//! Static pages served next to the sync endpoint.

use crate::error::ServerResult;
use std::borrow::Cow;
use std::io;
use std::path::Path;

const BUNDLED_INDEX: &str = include_str!("../assets/index.html");
const BUNDLED_SERVICE_WORKER: &str = include_str!("../assets/sw.js");
const BUNDLED_MANIFEST: &str = include_str!("../assets/app.webmanifest");

/// File name of the index page.
pub const INDEX_FILE: &str = "index.html";
/// File name of the service worker.
pub const SERVICE_WORKER_FILE: &str = "sw.js";
/// File name of the web app manifest.
pub const MANIFEST_FILE: &str = "app.webmanifest";

/// The index page, service worker and manifest.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    index: Cow<'static, str>,
    service_worker: Cow<'static, str>,
    manifest: Cow<'static, str>,
}

impl StaticAssets {
    /// Returns the copies compiled into the binary.
    pub fn bundled() -> Self {
        Self {
            index: Cow::Borrowed(BUNDLED_INDEX),
            service_worker: Cow::Borrowed(BUNDLED_SERVICE_WORKER),
            manifest: Cow::Borrowed(BUNDLED_MANIFEST),
        }
    }

    /// Loads the assets from `dir`.
    ///
    /// A file missing from `dir` falls back to the bundled copy.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read.
    pub fn from_dir(dir: &Path) -> ServerResult<Self> {
        let load = |name: &str, bundled: &'static str| -> ServerResult<Cow<'static, str>> {
            let path = dir.join(name);
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    tracing::debug!(path = %path.display(), "loaded asset");
                    Ok(Cow::Owned(content))
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Cow::Borrowed(bundled)),
                Err(e) => Err(e.into()),
            }
        };

        Ok(Self {
            index: load(INDEX_FILE, BUNDLED_INDEX)?,
            service_worker: load(SERVICE_WORKER_FILE, BUNDLED_SERVICE_WORKER)?,
            manifest: load(MANIFEST_FILE, BUNDLED_MANIFEST)?,
        })
    }

    /// Returns the index page.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Returns the service worker script.
    pub fn service_worker(&self) -> &str {
        &self.service_worker
    }

    /// Returns the web app manifest.
    pub fn manifest(&self) -> &str {
        &self.manifest
    }
}

impl Default for StaticAssets {
    fn default() -> Self {
        Self::bundled()
    }
}
