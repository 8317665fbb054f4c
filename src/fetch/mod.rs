// src/fetch/mod.rs

use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info, warn};

use crate::document::RawDocument;
use crate::error::Result;

pub mod cache;
pub mod remote;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use remote::RemoteSource;

/// Anything that can produce the primary document. `key` identifies it in the cache.
pub trait DocumentSource {
    fn key(&self) -> &str;
    fn fetch(&self) -> Result<RawDocument>;
}

/// Load the local copy of the document.
///
/// A missing file is [`crate::Error::NotFound`]; malformed JSON is [`crate::Error::Parse`].
pub fn load_fallback(path: &Path) -> Result<RawDocument> {
    let doc = RawDocument::read(path)?;
    info!(path = %path.display(), "loaded fallback document");
    Ok(doc)
}

/// Where the document of a run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Remote,
    Cache,
    /// The remote fetch failed with the given error kind.
    Fallback { cause: &'static str },
}

impl Origin {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Origin::Fallback { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub document: RawDocument,
    pub origin: Origin,
}

/// Primary source with a TTL cache in front and a local file behind.
pub struct DataSource<S: DocumentSource, C: Clock = SystemClock> {
    source: S,
    cache: TtlCache<RawDocument, C>,
    fallback: PathBuf,
}

impl<S: DocumentSource> DataSource<S, SystemClock> {
    pub fn new(source: S, cache_ttl: Duration, fallback: impl Into<PathBuf>) -> Self {
        Self::with_cache(source, TtlCache::new(cache_ttl), fallback)
    }
}

impl<S: DocumentSource, C: Clock> DataSource<S, C> {
    pub fn with_cache(
        source: S,
        cache: TtlCache<RawDocument, C>,
        fallback: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            cache,
            fallback: fallback.into(),
        }
    }

    pub fn fallback_path(&self) -> &Path {
        &self.fallback
    }

    /// Cached document if fresh, else one remote attempt, else the fallback file.
    ///
    /// Only successful remote results are cached. Errors from the fallback
    /// file are returned as-is.
    pub fn load(&mut self) -> Result<Loaded> {
        let key = self.source.key().to_string();
        if let Some(document) = self.cache.get(&key) {
            debug!(key = %key, "cache hit");
            return Ok(Loaded {
                document,
                origin: Origin::Cache,
            });
        }

        match self.source.fetch() {
            Ok(document) => {
                self.cache.insert(key, document.clone());
                Ok(Loaded {
                    document,
                    origin: Origin::Remote,
                })
            }
            Err(e) => {
                warn!(
                    kind = e.kind(),
                    error = %e,
                    fallback = %self.fallback.display(),
                    "remote fetch failed; using fallback document"
                );
                let document = load_fallback(&self.fallback)?;
                Ok(Loaded {
                    document,
                    origin: Origin::Fallback { cause: e.kind() },
                })
            }
        }
    }
}
