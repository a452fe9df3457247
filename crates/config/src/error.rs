//! Result and Error types for pcdvc-config

/// Type alias for `Result<T, config::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `pcdvc-config` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The first constraint violated by a set of [Settings](crate::Settings)
    #[error("invalid configuration for \"{field}\" ({reason})")]
    InvalidConfiguration { field: &'static str, reason: String },

    /// Failure to deserialise settings from a JSON string
    #[error("failed serde JSON operation")]
    JsonError(#[from] serde_json::Error),
}
