use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeederError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Giving up on {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    // Extraction errors
    #[error("Invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    // Storage errors
    #[error("Seen store error: {0}")]
    Store(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Delivery errors
    #[error("Webhook error: {0}")]
    Webhook(#[from] webhook::WebhookError),

    #[error("Delivery aborted after {sent} messages: {reason}")]
    DeliveryAborted { sent: usize, reason: String },

    // Export errors
    #[error("Export failed: {0}")]
    Export(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FeederResult<T> = Result<T, FeederError>;
