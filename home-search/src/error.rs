use storefront_dom::DomError;
use storefront_section_renderer::RenderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeSearchError {
    /// A ref the component cannot work without is absent at mount.
    #[error("missing required ref `{0}`")]
    MissingRef(&'static str),

    /// The render collaborator returned markup without an expected landmark.
    #[error("section markup contract violated: {0}")]
    ContractViolation(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Markup(#[from] DomError),

    #[error("invalid storefront url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid home search config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, HomeSearchError>;
