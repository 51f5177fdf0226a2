/// Top-level error type for a charge export run.
///
/// Every variant is fatal to the run; the binary reports it and exits non-zero.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid month selector: {0}")]
    DateRange(#[from] ParseError),
    #[error("Invalid card expiry on charge {charge}: {source}")]
    CardExpiry { charge: String, source: ParseError },
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Errors while parsing `MM/YYYY` month strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{input:?} does not match the MM/YYYY format")]
    Format { input: String },

    #[error("{input:?} has month {month}, expected 01 to 12")]
    Month { input: String, month: u32 },
}

/// Errors returned by the remote charges API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("invalid request ({status}): {message}")]
    InvalidRequest { status: u16, message: String },

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("invalid api base url: {0}")]
    BaseUrl(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// Map a non-success HTTP status and its error message to an `ApiError`.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => ApiError::Unauthorized(message),
            402 => ApiError::RequestFailed(message),
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited(message),
            400..=499 => ApiError::InvalidRequest { status, message },
            _ => ApiError::Server { status, message },
        }
    }
}
