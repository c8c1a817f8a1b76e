use thiserror::Error;

/// Errors raised while decoding event listener frames.
///
/// Every error except `PayloadTooLong` is reported after the offending frame
/// has been consumed from the input buffer, so decoding can resume with the
/// next frame. An oversized payload is left in place; only its header is
/// dropped.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("header line exceeds {limit} bytes")]
    HeaderTooLong { limit: usize },

    #[error("payload of {len} bytes exceeds {limit} bytes")]
    PayloadTooLong { len: usize, limit: usize },

    #[error("malformed token {0:?}: expected key:value")]
    MalformedToken(String),

    #[error("header is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid value {value:?} for header field `{field}`")]
    InvalidField { field: &'static str, value: String },

    #[error("frame is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
