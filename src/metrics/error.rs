use thiserror::Error;

/// Errors raised while building a [`Recorder`](super::Recorder).
///
/// Both are startup failures: a recorder that is only partly registered would
/// expose an incomplete scrape surface, so neither is ever swallowed.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// The metrics backend rejected the instrument definition.
    #[error("failed to create metric {metric}: {source}")]
    Instrument {
        metric: String,
        #[source]
        source: prometheus::Error,
    },

    /// A collector with the same name and labels is already registered.
    #[error("failed to register metric {metric}: {source}")]
    Registration {
        metric: String,
        #[source]
        source: prometheus::Error,
    },
}

impl RecorderError {
    /// Fully qualified name of the metric that failed.
    pub fn metric(&self) -> &str {
        match self {
            RecorderError::Instrument { metric, .. } => metric,
            RecorderError::Registration { metric, .. } => metric,
        }
    }

    /// True when the failure is a duplicate registration.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            RecorderError::Registration {
                source: prometheus::Error::AlreadyReg,
                ..
            }
        )
    }
}
