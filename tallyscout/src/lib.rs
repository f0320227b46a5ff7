pub mod config;
pub mod count;
pub mod errors;
pub mod metrics;
pub mod pipeline;
pub mod results;
pub mod source;

pub use crate::config::{CliOverrides, CountConfig};
pub use crate::count::{DefaultCounter, SourceCount, SourceCounter, TermMatcher};
pub use crate::errors::{CountError, CountResult};
pub use crate::pipeline::{run, Reporter, StreamReporter};
pub use crate::results::{ItemOutcome, RunSummary, WorkItem};
pub use crate::source::{is_url, Source};
