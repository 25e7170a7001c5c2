use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Database connection error: {0}")]
    Connection(String),

    /// A venue rejected a request for a business reason (bad symbol,
    /// order already filled, ...). Never retried; caller logs and moves on.
    #[error("Exchange error on {exchange}: {message}")]
    Exchange { exchange: String, message: String },

    /// The adapter could not reach the venue at all (timeout, connection
    /// reset, 5xx). Distinct from `Exchange` so callers know to retry.
    #[error("Transient network error on {exchange}: {message}")]
    Transient { exchange: String, message: String },

    /// Venue rate-limited the request. Treated as transient but callers
    /// should honor the venue's own spacing before the next retry.
    #[error("Rate limited on {exchange}: {message}")]
    RateLimit { exchange: String, message: String },

    /// A book or balance snapshot fell outside its freshness window.
    #[error("Stale data for {exchange}/{market}")]
    StaleData { exchange: String, market: String },

    /// Sizing landed below the venue's minimum order value, or the
    /// wallet lacks the balance to cover it.
    #[error("Insufficient balance on {exchange} for {currency}")]
    InsufficientBalance { exchange: String, currency: String },

    /// A fill or order-status reply didn't match what was expected
    /// (wrong order id, impossible filled quantity, ...).
    #[error("Inconsistent reply from {exchange}: {message}")]
    InconsistentReply { exchange: String, message: String },

    /// A rendezvous wait exceeded its route-family timeout.
    #[error("Execution timed out waiting on {stage}")]
    Timeout { stage: String },

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Route build error: {0}")]
    Route(String),
}

pub type Result<T> = std::result::Result<T, Error>;
