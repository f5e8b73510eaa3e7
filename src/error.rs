use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrackError {
    #[error("invalid MD5 hash {0:?}: expected 32 hex characters")]
    InvalidHash(String),

    #[error("unknown password scheme: {0}")]
    UnknownScheme(String),

    #[error("index {index} out of range for scheme {scheme} (size {size})")]
    InvalidIndex {
        scheme: &'static str,
        index: u64,
        size: u64,
    },

    #[error("range [{lo}, {hi}] is outside scheme bounds [0, {size})")]
    InvalidRange { lo: u64, hi: u64, size: u64 },

    #[error("invalid configuration value for {key}: {value:?}")]
    Config { key: &'static str, value: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CrackError>;
