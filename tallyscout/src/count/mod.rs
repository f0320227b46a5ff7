/// Counters turn a classified [`Source`] into an occurrence count.
///
/// The pipeline only knows about the [`SourceCounter`] trait. The real
/// implementation, [`DefaultCounter`], routes URLs to [`HttpCounter`] and
/// everything else to [`FileCounter`]; tests plug in their own counters to
/// delay items or observe how many run at once.
///
/// ```rust,ignore
/// let matcher = TermMatcher::new("Go");
/// let counter = DefaultCounter::new(matcher, Duration::from_secs(10))?;
/// let found = counter.count(&Source::classify("notes.txt")).await?;
/// ```
pub mod file;
pub mod http;
pub mod matcher;

pub use file::FileCounter;
pub use http::HttpCounter;
pub use matcher::TermMatcher;

use std::future::Future;
use std::time::Duration;

use crate::config::CountConfig;
use crate::errors::CountResult;
use crate::source::Source;

/// What a successful count produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCount {
    /// Non-overlapping occurrences of the term
    pub occurrences: usize,
    /// Bytes read from the source
    pub bytes_scanned: u64,
}

impl SourceCount {
    pub fn new(occurrences: usize, bytes_scanned: u64) -> Self {
        Self {
            occurrences,
            bytes_scanned,
        }
    }

    /// A count with no byte accounting
    pub fn occurrences(occurrences: usize) -> Self {
        Self::new(occurrences, 0)
    }
}

/// Counts the search term in one source
pub trait SourceCounter: Send + Sync + 'static {
    fn count(&self, source: &Source) -> impl Future<Output = CountResult<SourceCount>> + Send;
}

/// Routes URLs to HTTP and everything else to the filesystem
#[derive(Debug, Clone)]
pub struct DefaultCounter {
    files: FileCounter,
    http: HttpCounter,
}

impl DefaultCounter {
    pub fn new(matcher: TermMatcher, http_timeout: Duration) -> CountResult<Self> {
        Ok(Self {
            files: FileCounter::new(matcher.clone()),
            http: HttpCounter::new(matcher, http_timeout)?,
        })
    }

    pub fn from_config(config: &CountConfig) -> CountResult<Self> {
        Self::new(
            TermMatcher::new(&config.search_term),
            config.http_timeout(),
        )
    }
}

impl SourceCounter for DefaultCounter {
    async fn count(&self, source: &Source) -> CountResult<SourceCount> {
        let (occurrences, bytes) = match source {
            Source::Url(url) => self.http.count(url).await?,
            Source::File(path) => self.files.count(path).await?,
        };
        Ok(SourceCount::new(occurrences, bytes))
    }
}
