//! Deploy error types.

use std::path::PathBuf;

use crate::classifier::RejectionLayer;

/// Errors produced by a bundle deployment.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The bundle archive was not on disk when the upload was about to start.
    #[error("Bundle does not exist: '{}'", .0.display())]
    BundleMissing(PathBuf),

    /// The endpoint answered with a non-200 status.
    ///
    /// `message` is already layer-specific; it is displayed verbatim.
    #[error("{message}")]
    Rejected {
        layer: RejectionLayer,
        message: String,
    },

    #[error("invalid deploy target '{endpoint}': {reason}")]
    InvalidTarget { endpoint: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed deploy service response: {0}")]
    MalformedResponse(String),
}

impl DeployError {
    /// Returns the rejection message when the service refused the bundle.
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    /// True for failures raised before or while talking to the endpoint
    /// (target construction, file access, connectivity).
    pub fn is_io_class(&self) -> bool {
        matches!(
            self,
            Self::InvalidTarget { .. } | Self::Io(_) | Self::Http(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_missing_message() {
        let err = DeployError::BundleMissing(PathBuf::from("/work/target/app.zip"));
        assert_eq!(err.to_string(), "Bundle does not exist: '/work/target/app.zip'");
        assert!(!err.is_io_class());
    }

    #[test]
    fn rejected_displays_message_verbatim() {
        let err = DeployError::Rejected {
            layer: RejectionLayer::Gateway,
            message: "<err>boom</err>".into(),
        };
        assert_eq!(err.to_string(), "<err>boom</err>");
        assert_eq!(err.rejection_message(), Some("<err>boom</err>"));
    }

    #[test]
    fn invalid_target_is_io_class() {
        let err = DeployError::InvalidTarget {
            endpoint: "mailto:ops".into(),
            reason: "cannot be a base".into(),
        };
        assert!(err.is_io_class());
        assert!(err.rejection_message().is_none());
    }
}
