use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("proximity module is not available on this platform")]
    ModuleUnavailable,
    #[error("failed to register proximity listener: {0}")]
    Subscription(String),
    #[error("failed to render plot: {0}")]
    Plot(String),
}

impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for StreamError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        StreamError::Plot(format!("{value:?}"))
    }
}

impl From<image::ImageError> for StreamError {
    fn from(value: image::ImageError) -> Self {
        StreamError::Plot(value.to_string())
    }
}
