use thiserror::Error;

/// Failures while turning a source into paragraphs. All of them are fatal
/// for the request.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported source kind (expected http(s) URL, .pdf or .docx): {0}")]
    UnsupportedSourceKind(String),

    #[error("fetch failed for {url}: {reason}")]
    FetchError { url: String, reason: String },

    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {kind} document {path}: {reason}")]
    Parse {
        kind: &'static str,
        path: String,
        reason: String,
    },
}

/// Failures reported by a remote translation backend. These never cross the
/// translator boundary; they are retried or replaced with a sentinel.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{backend}: transport error: {reason}")]
    Transport { backend: String, reason: String },

    #[error("{backend}: unexpected status {status}: {body}")]
    Status {
        backend: String,
        status: u16,
        body: String,
    },

    #[error("{backend}: malformed response: {reason}")]
    Malformed { backend: String, reason: String },

    #[error("{backend}: not configured: {reason}")]
    NotConfigured { backend: String, reason: String },
}
