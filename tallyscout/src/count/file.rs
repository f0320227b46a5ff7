use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::trace;

use super::matcher::TermMatcher;
use crate::errors::{CountError, CountResult};

const BUFFER_CAPACITY: usize = 65536;

/// Counts the term in local files, one line at a time
#[derive(Debug, Clone)]
pub struct FileCounter {
    matcher: TermMatcher,
}

impl FileCounter {
    pub fn new(matcher: TermMatcher) -> Self {
        Self { matcher }
    }

    /// Opens `path` and sums the per-line occurrence counts.
    ///
    /// Returns the count and the number of bytes read.
    pub async fn count(&self, path: &Path) -> CountResult<(usize, u64)> {
        trace!("Counting file: {}", path.display());

        let file = File::open(path)
            .await
            .map_err(|e| CountError::from_open(path, e))?;

        let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
        let mut line = Vec::with_capacity(256);
        let mut count = 0;
        let mut bytes_read = 0u64;

        loop {
            line.clear();
            let n = reader.read_until(b'\n', &mut line).await?;
            if n == 0 {
                break;
            }
            bytes_read += n as u64;
            count += self.matcher.count(strip_line_ending(&line));
        }

        trace!(
            "Finished {}: {} occurrences in {} bytes",
            path.display(),
            count,
            bytes_read
        );
        Ok((count, bytes_read))
    }
}

/// Drops a trailing `\n` or `\r\n`
pub(crate) fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
