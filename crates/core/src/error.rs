/// Failure reported by a [`PersistenceGateway`](crate::gateway::PersistenceGateway).
///
/// The underlying storage error is kept as the source so callers can still
/// downcast it (e.g. to `sqlx::Error`).
#[derive(Debug, thiserror::Error)]
#[error("Persistence failed: {source}")]
pub struct PersistenceError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl PersistenceError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Borrow the underlying storage error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Unknown key, bad enum value, non-boolean flag, broken cross-field
    /// invariant or unresolvable recipient. Always a caller bug.
    #[error("Invalid notice options: {0}")]
    InvalidOptions(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl NotifyError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        NotifyError::InvalidOptions(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_error_keeps_source_message() {
        let err = PersistenceError::new("connection reset");
        assert_eq!(err.to_string(), "Persistence failed: connection reset");
        assert_eq!(err.inner().to_string(), "connection reset");
    }

    #[test]
    fn persistence_error_converts_into_notify_error() {
        let err: NotifyError = PersistenceError::new("disk full").into();
        assert_eq!(err.to_string(), "Persistence failed: disk full");
    }

    #[test]
    fn invalid_options_display() {
        let err = NotifyError::invalid("cannot use details without persist");
        assert_eq!(
            err.to_string(),
            "Invalid notice options: cannot use details without persist"
        );
    }
}
