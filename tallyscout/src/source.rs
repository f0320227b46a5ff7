use reqwest::Url;
use std::fmt;
use std::path::PathBuf;

/// Where the bytes for one work item come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(Url),
    File(PathBuf),
}

impl Source {
    /// Classifies a raw input line. Anything that is not an absolute URL with
    /// both a scheme and a host is treated as a file path.
    pub fn classify(item: &str) -> Self {
        match parse_url(item) {
            Some(url) => Source::Url(url),
            None => Source::File(PathBuf::from(item)),
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Source::Url(_))
    }

    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Url(_) => "url",
            Source::File(_) => "file",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{}", url),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Returns true only if `item` parses as an absolute URL with a scheme and a
/// non-empty host.
pub fn is_url(item: &str) -> bool {
    parse_url(item).is_some()
}

fn parse_url(item: &str) -> Option<Url> {
    if !has_literal_authority(item) {
        return None;
    }
    let url = Url::parse(item).ok()?;
    match url.host_str() {
        Some(host) if !host.is_empty() && !url.scheme().is_empty() => Some(url),
        _ => None,
    }
}

/// Checks for a literal `<scheme>://<authority>` prefix. `Url::parse` repairs
/// forms like `http:host` or `https:\\host` into URLs; those stay file paths.
fn has_literal_authority(item: &str) -> bool {
    if item.trim() != item {
        return false;
    }
    let Some((scheme, rest)) = item.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    scheme_ok && !authority.is_empty() && !authority.contains('\\')
}
