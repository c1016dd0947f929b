/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum MockApiError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error after {attempts} attempt(s): {source}")]
    Transport {
        /// Attempts made before giving up.
        attempts: usize,
        /// Whether the failure was a connection-level one the retry loop would retry.
        retryable: bool,
        #[source]
        source: reqwest::Error,
    },
    /// 5xx status that was still failing when the attempt budget ran out.
    #[error("server error {status} after {attempts} attempt(s): {body}")]
    Server {
        status: u16,
        body: String,
        attempts: usize,
    },
    /// Non-retryable HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Response body is not JSON, or not the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Coarse classification callers use to pick a user-facing message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Upstream unreachable or overloaded; worth trying again later.
    Transient,
    /// Upstream refused the request itself, or it could not be sent at all.
    Rejected,
    /// Upstream answered with something that could not be decoded.
    Decode,
}

impl MockApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport {
                retryable: true, ..
            }
            | Self::Server { .. } => ErrorKind::Transient,
            Self::Transport {
                retryable: false, ..
            }
            | Self::Http { .. } => ErrorKind::Rejected,
            Self::Decode(_) => ErrorKind::Decode,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// HTTP status of the final response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }

    /// Number of attempts spent, for errors raised by the retry loop.
    pub fn attempts(&self) -> Option<usize> {
        match self {
            Self::Transport { attempts, .. } | Self::Server { attempts, .. } => Some(*attempts),
            Self::Http { .. } => Some(1),
            Self::Decode(_) => None,
        }
    }
}
