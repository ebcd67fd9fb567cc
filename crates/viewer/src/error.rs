use render::RenderError;
use streaming::{AtlasError, DecodeError, FetchError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewerError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Atlas(#[from] AtlasError),
}
