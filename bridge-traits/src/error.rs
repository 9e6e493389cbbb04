use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Audio source rejected: {0}")]
    InvalidSource(String),

    #[error("Invalid argument '{key}': {message}")]
    InvalidArgument { key: String, message: String },

    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
