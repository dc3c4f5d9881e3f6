use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid run metadata: {0}")]
    InvalidMetadata(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    /// Stable machine-readable code, used in structured log fields.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Io(_) => "io",
            LedgerError::Json(_) => "json",
            LedgerError::Storage(_) => "storage",
            LedgerError::InvalidMetadata(_) => "invalid_metadata",
            LedgerError::InvalidRequest(_) => "invalid_request",
            LedgerError::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_display_includes_detail() {
        let error = LedgerError::Storage("disk full".to_owned());
        assert_eq!(error.to_string(), "storage error: disk full");
        assert_eq!(error.code(), "storage");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = LedgerError::from(io);
        assert!(matches!(error, LedgerError::Io(_)));
    }
}
