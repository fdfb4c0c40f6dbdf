use thiserror::Error;
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("sample frame is empty")]
    EmptyFrame,
    #[error("sample frame has odd length {0}; expected 16-bit samples")]
    OddFrameLength(usize),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("device rejected configuration: {0}")]
    ConfigRejected(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for ScopeError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ScopeError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for ScopeError {
    fn from(value: image::ImageError) -> Self {
        ScopeError::Plot(value.to_string())
    }
}
