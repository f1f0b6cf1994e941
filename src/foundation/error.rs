/// Convenience result type used across slicestitch.
pub type StitchResult<T> = Result<T, StitchError>;

/// Top-level error taxonomy used by the stitching APIs.
#[derive(thiserror::Error, Debug)]
pub enum StitchError {
    /// Malformed or empty request shape, rejected before compositing starts.
    #[error("request error: {0}")]
    Request(String),

    /// An input fragment is not a valid or recognized image.
    #[error("decode error{}: {message}", fragment_label(.fragment))]
    Decode {
        /// Index of the failing fragment, when known.
        fragment: Option<usize>,
        /// Codec diagnostic.
        message: String,
    },

    /// Fragments disagree on width.
    #[error("width mismatch: fragment {index} has width {found}, expected {expected}")]
    WidthMismatch {
        /// Index of the first offending fragment.
        index: usize,
        /// Width of fragment 0.
        expected: u32,
        /// Width of the offending fragment.
        found: u32,
    },

    /// Canvas or pixel buffer could not be allocated.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Final serialization failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn fragment_label(fragment: &Option<usize>) -> String {
    match fragment {
        Some(i) => format!(" (fragment {i})"),
        None => String::new(),
    }
}

/// Stable machine-readable error category reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// See [`StitchError::Request`].
    RequestError,
    /// See [`StitchError::Decode`].
    DecodeError,
    /// See [`StitchError::WidthMismatch`].
    WidthMismatchError,
    /// See [`StitchError::ResourceExhausted`].
    ResourceExhaustedError,
    /// See [`StitchError::Encode`].
    EncodeError,
    /// See [`StitchError::Other`].
    InternalError,
}

impl StitchError {
    /// Build a [`StitchError::Request`] value.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    /// Build a [`StitchError::Decode`] value without a fragment index.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            fragment: None,
            message: msg.into(),
        }
    }

    /// Build a [`StitchError::ResourceExhausted`] value.
    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    /// Build a [`StitchError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Attach a fragment index to a decode error that does not carry one yet.
    ///
    /// Other variants are returned unchanged.
    pub fn at_fragment(self, index: usize) -> Self {
        match self {
            Self::Decode {
                fragment: None,
                message,
            } => Self::Decode {
                fragment: Some(index),
                message,
            },
            other => other,
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Request(_) => ErrorKind::RequestError,
            Self::Decode { .. } => ErrorKind::DecodeError,
            Self::WidthMismatch { .. } => ErrorKind::WidthMismatchError,
            Self::ResourceExhausted(_) => ErrorKind::ResourceExhaustedError,
            Self::Encode(_) => ErrorKind::EncodeError,
            Self::Other(_) => ErrorKind::InternalError,
        }
    }

    /// HTTP status a transport should answer with.
    ///
    /// Caller input errors (including width mismatch) are 400; everything else is 500.
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::RequestError | ErrorKind::WidthMismatchError => 400,
            ErrorKind::DecodeError
            | ErrorKind::ResourceExhaustedError
            | ErrorKind::EncodeError
            | ErrorKind::InternalError => 500,
        }
    }
}

/// Structured `{errorKind, message}` object handed to the transport on failure.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// Error category.
    pub error_kind: ErrorKind,
    /// Human-readable diagnostic.
    pub message: String,
}

impl From<&StitchError> for ErrorReport {
    fn from(err: &StitchError) -> Self {
        Self {
            error_kind: err.kind(),
            message: format!("{err:#}"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
