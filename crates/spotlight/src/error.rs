use std::time::Duration;

use thiserror::Error;

use crate::model::TargetKind;

pub type Result<T> = std::result::Result<T, SpotlightError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpotlightError {
    #[error("host cannot display spotlight overlays: {reason}")]
    InvalidHostContext { reason: String },

    #[error("invalid spotlight configuration: {message}")]
    InvalidConfig { message: String },

    #[error("target {target} unavailable after {}ms", waited.as_millis())]
    TargetUnavailable { target: TargetKind, waited: Duration },

    #[error("blur overlays are not supported by this host")]
    BlurUnsupported,
}

impl SpotlightError {
    #[must_use]
    pub fn invalid_host(reason: impl Into<String>) -> Self {
        Self::InvalidHostContext {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unavailable(target: TargetKind, waited: Duration) -> Self {
        Self::TargetUnavailable { target, waited }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_message_names_target_and_wait() {
        let error = SpotlightError::unavailable(TargetKind::ListItem(4), Duration::from_millis(2000));
        assert_eq!(error.to_string(), "target list item #4 unavailable after 2000ms");
    }

    #[test]
    fn invalid_host_preserves_reason() {
        let error = SpotlightError::invalid_host("no window");
        assert_eq!(
            error.to_string(),
            "host cannot display spotlight overlays: no window"
        );
    }
}
