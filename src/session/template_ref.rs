//! Template reference: a path the service can open, or inline source.

use std::fmt;

use crate::protocol::format;

/// What the service should render.
///
/// The variant decides the segment-2 format tag of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateRef {
    /// Filesystem path resolvable by the rendering service (not by this process).
    Path(String),
    /// Inline template source text.
    Source(String),
}

impl TemplateRef {
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    pub fn source(source: impl Into<String>) -> Self {
        Self::Source(source.into())
    }

    /// Format tag sent alongside the reference.
    #[inline]
    pub fn format(&self) -> u8 {
        match self {
            Self::Path(_) => format::PATH,
            Self::Source(_) => format::TEXT,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Path(s) | Self::Source(s) => s,
        }
    }
}

impl fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path),
            Self::Source(source) => write!(f, "<inline source, {} bytes>", source.len()),
        }
    }
}
