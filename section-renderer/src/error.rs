use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("section request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("section request to {url} returned {status}")]
    Status { status: StatusCode, url: String },
}

pub type Result<T> = std::result::Result<T, RenderError>;
