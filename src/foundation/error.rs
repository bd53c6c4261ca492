/// Crate-wide result alias.
pub type WaterfallResult<T> = Result<T, WaterfallError>;

#[derive(thiserror::Error, Debug)]
/// Error taxonomy for loading, aggregation, choreography and export.
pub enum WaterfallError {
    /// Input records are malformed (quintile out of range, non-finite measure value).
    #[error("data validation error: {0}")]
    DataValidation(String),

    /// A source dataset could not be read or parsed.
    #[error("data load error: {0}")]
    DataLoad(String),

    /// Configuration values are inconsistent.
    #[error("config error: {0}")]
    Config(String),

    /// An engine operation was invoked in a state that does not allow it.
    #[error("choreography error: {0}")]
    Choreography(String),

    /// The renderer rejected a request or an export failed.
    #[error("render error: {0}")]
    Render(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WaterfallError {
    /// Build a [`WaterfallError::DataValidation`].
    pub fn data_validation(msg: impl Into<String>) -> Self {
        Self::DataValidation(msg.into())
    }

    /// Build a [`WaterfallError::DataLoad`].
    pub fn data_load(msg: impl Into<String>) -> Self {
        Self::DataLoad(msg.into())
    }

    /// Build a [`WaterfallError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`WaterfallError::Choreography`].
    pub fn choreography(msg: impl Into<String>) -> Self {
        Self::Choreography(msg.into())
    }

    /// Build a [`WaterfallError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`WaterfallError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
