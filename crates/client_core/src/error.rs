use thiserror::Error;

/// Client-side failures that happen before a safe action result is available.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("could not reach the registration service")]
    Transport(#[from] reqwest::Error),
    #[error("registration service answered with unexpected status {status}")]
    UnexpectedResponse { status: u16 },
}
