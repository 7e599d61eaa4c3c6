use thiserror::Error;

pub type DashResult<T> = Result<T, DashError>;

#[derive(Debug, Error)]
pub enum DashError {
    #[error("render target unavailable for chart `{chart}`")]
    RenderTargetUnavailable { chart: String },

    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("malformed series: {0}")]
    MalformedSeries(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("chart backend failure: {0}")]
    Backend(String),
}

impl DashError {
    /// Returns `true` for errors the dashboard absorbs by rendering an empty state.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DataUnavailable(_))
    }
}
