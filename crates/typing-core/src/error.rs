use thiserror::Error;

/// Errors surfaced by the note/section stores and the signin adapters.
#[derive(Debug, Error)]
pub enum Error {
    /// Client input failed validation.
    #[error("{0}")]
    Validation(String),

    /// The requested note or section does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The upstream API rejected the access token.
    #[error("authorization token is invalid or expired")]
    Unauthorized,

    /// The upstream API answered with a non-success status.
    #[error("upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The upstream API could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// A payload could not be encoded or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Classify a non-success upstream status.
    ///
    /// 401 becomes `Unauthorized`; everything else keeps its status and body.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        if status == 401 {
            Self::Unauthorized
        } else {
            Self::Upstream {
                status,
                message: message.into(),
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
