use memchr::memmem::Finder;
use std::sync::Arc;

/// Counts non-overlapping occurrences of one literal term in byte slices.
///
/// The term is compiled once into a `memmem` finder and shared between
/// workers, so cloning a matcher is cheap.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    finder: Arc<Finder<'static>>,
}

impl TermMatcher {
    /// Creates a matcher for `term`. An empty term matches nothing.
    pub fn new(term: impl AsRef<[u8]>) -> Self {
        Self {
            finder: Arc::new(Finder::new(term.as_ref()).into_owned()),
        }
    }

    pub fn term(&self) -> &[u8] {
        self.finder.needle()
    }

    /// Number of non-overlapping occurrences of the term in `haystack`
    pub fn count(&self, haystack: &[u8]) -> usize {
        if self.term().is_empty() {
            return 0;
        }
        self.finder.find_iter(haystack).count()
    }
}
