use thiserror::Error;

/// Errors raised while resolving a skill's file set.
///
/// Per-file problems (oversize, binary, unreadable) are deliberately not
/// represented here as fatal variants: they degrade to unverifiable-reason
/// entries on the resolved skill instead. Only failures that make the whole
/// resolution unusable surface as `ResolveError`.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Skill identifier is neither `owner/repo` nor a github.com URL
    #[error("Invalid repository input: {0}")]
    InvalidRepoInput(String),

    /// No SKILL.md matched the requested skill name
    #[error("Skill '{skill}' not found in {origin}")]
    SkillNotFound { skill: String, origin: String },

    /// Authentication/authorization failure (401/403)
    #[error("Authentication failed (HTTP {status}) for {url}")]
    Auth { status: u16, url: String },

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded for {0}")]
    RateLimited(String),

    /// Server-side failure (500/502/503/504)
    #[error("Server error (HTTP {status}) for {url}")]
    Server { status: u16, url: String },

    /// Request timed out
    #[error("Request timed out for {0}")]
    Timeout(String),

    /// Transport-level failure that is not timeout-like
    #[error("Network error: {0}")]
    Network(String),

    /// Unexpected HTTP status outside the classified set
    #[error("Unexpected HTTP status {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// Malformed API payload (JSON shape, blob encoding)
    #[error("API response error: {0}")]
    Api(String),

    /// The skill's entry file itself could not be read as text
    #[error("Skill file {path} is unreadable: {reason}")]
    SkillFileUnreadable { path: String, reason: String },

    /// A file was rejected before or during fetch
    #[error("{path}: {reason}")]
    FileRejected { path: String, reason: String },

    /// Retry budget exhausted on a retryable failure
    #[error("Giving up after {attempts} attempts")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<ResolveError>,
    },

    /// No readable files remained after filtering
    #[error("No readable skill files after filtering")]
    EmptyFileSet,

    /// Archive could not be opened or is malformed
    #[error("Archive error: {0}")]
    Archive(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolveError {
    /// Only rate limits, server-side errors, and timeouts are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ResolveError::RateLimited(_) | ResolveError::Server { .. } | ResolveError::Timeout(_)
        )
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, ResolveError::Auth { .. })
    }
}
