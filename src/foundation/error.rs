pub type OverlayResult<T> = Result<T, OverlayError>;

#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("extraction error: {0}")]
    Extraction(String),

    #[error("composite error: {0}")]
    Composite(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("payload too large: {actual} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { actual: u64, limit: u64 },

    #[error("timeout: processing exceeded {0} ms")]
    Timeout(u64),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OverlayError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    pub fn composite(msg: impl Into<String>) -> Self {
        Self::Composite(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn payload_too_large(actual: u64, limit: u64) -> Self {
        Self::PayloadTooLarge { actual, limit }
    }

    /// Stable machine-readable kind, used in logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "DecodeError",
            Self::Extraction(_) => "ExtractionError",
            Self::Composite(_) => "CompositeError",
            Self::Encode(_) => "EncodeError",
            Self::Config(_) => "ConfigError",
            Self::PayloadTooLarge { .. } => "PayloadTooLargeError",
            Self::Timeout(_) => "TimeoutError",
            Self::Other(_) => "InternalError",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
