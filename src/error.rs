use thiserror::Error;

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Errors raised by the aggregation core. Always returned before any work
/// is done.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl AnalyticsError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        AnalyticsError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
