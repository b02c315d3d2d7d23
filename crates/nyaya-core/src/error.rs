/// Failure taxonomy shared by the catalog and the guidance operations.
#[derive(Debug, thiserror::Error)]
pub enum GuidanceError {
    /// Caller input failed a precondition (missing, empty or oversized field).
    #[error("{0}")]
    InvalidArgument(String),
    /// Catalog data failed its schema check at load time. Fatal.
    #[error("invalid rights record {record}: field `{field}` {reason}")]
    Validation {
        record: String,
        field: String,
        reason: String,
    },
    #[error("{0} not found")]
    NotFound(String),
    /// The model call failed, timed out or was cancelled.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    /// The model reply was not JSON or broke the contract for its shape.
    #[error("failed to parse model response: {reason}")]
    ResponseParse { reason: String },
}

impl GuidanceError {
    pub(crate) fn validation(
        record: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            record: record.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(reason: impl Into<String>) -> Self {
        Self::ResponseParse {
            reason: reason.into(),
        }
    }
}

pub type GuidanceResult<T> = std::result::Result<T, GuidanceError>;
