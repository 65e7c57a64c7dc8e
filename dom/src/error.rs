use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("malformed markup at byte {position}: {message}")]
    MalformedMarkup { position: usize, message: String },

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl DomError {
    pub(crate) fn invalid_selector(selector: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DomError>;
