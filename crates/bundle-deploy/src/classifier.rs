//! Response classification.
//!
//! The managed bundles endpoint sits behind several layers and each one
//! reports errors in its own format:
//!
//! | Status | Content type        | Layer          | Message                     |
//! |--------|---------------------|----------------|-----------------------------|
//! | 200    | any                 | —              | success                     |
//! | ≠200   | none or repeated    | HTTP           | status line                 |
//! | ≠200   | `application/xml`   | gateway        | raw body                    |
//! | ≠200   | `application/json`  | deploy service | `message` plus detail       |
//! | ≠200   | anything else       | platform       | raw body                    |

use std::fmt;
use std::fmt::Write;

use serde_json::Value;

use crate::error::DeployError;
use crate::json::{as_text, find_field};
use crate::types::HttpResponse;

const CONTENT_TYPE_XML: &str = "application/xml";
const CONTENT_TYPE_JSON: &str = "application/json";

const INVALID_PARAMETERS: &str = "Some of the supplied parameters were invalid";
const DEPLOYMENT_FAILURE: &str = "Bundle deployment failure";

/// The layer that rejected a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionLayer {
    /// Non-200 without a usable content type.
    Http,
    /// Hosting web tier, before the deploy service is reached.
    Gateway,
    /// The CICS platform, in its native text format.
    Platform,
    /// The deploy service itself.
    Service,
}

impl fmt::Display for RejectionLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Http => "http",
            Self::Gateway => "gateway",
            Self::Platform => "platform",
            Self::Service => "deploy service",
        })
    }
}

/// Shape of a deploy service JSON error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// `requestErrors` lists the offending parameters.
    InvalidParameters,
    /// `deployments` carries a nested `message`.
    DeploymentFailure,
    /// Any other message; no detail is extracted.
    Other,
}

/// Classified outcome of one deploy response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    Status { status_line: String },
    Gateway { body: String },
    Platform { body: String },
    Service { kind: ServiceErrorKind, message: String },
}

impl ResponseClass {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the rejecting layer, or `None` on success.
    pub fn layer(&self) -> Option<RejectionLayer> {
        match self {
            Self::Success => None,
            Self::Status { .. } => Some(RejectionLayer::Http),
            Self::Gateway { .. } => Some(RejectionLayer::Gateway),
            Self::Platform { .. } => Some(RejectionLayer::Platform),
            Self::Service { .. } => Some(RejectionLayer::Service),
        }
    }

    /// Returns the user-facing failure message, or `None` on success.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Status { status_line } => Some(status_line.as_str()),
            Self::Gateway { body } | Self::Platform { body } => Some(body.as_str()),
            Self::Service { message, .. } => Some(message.as_str()),
        }
    }

    /// Converts a rejection into `DeployError::Rejected`.
    pub fn into_result(self) -> Result<(), DeployError> {
        let (layer, message) = match self {
            Self::Success => return Ok(()),
            Self::Status { status_line } => (RejectionLayer::Http, status_line),
            Self::Gateway { body } => (RejectionLayer::Gateway, body),
            Self::Platform { body } => (RejectionLayer::Platform, body),
            Self::Service { message, .. } => (RejectionLayer::Service, message),
        };
        Err(DeployError::Rejected { layer, message })
    }
}

/// Classifies a transport response.
pub fn classify_response(response: &HttpResponse) -> Result<ResponseClass, DeployError> {
    classify(
        response.status,
        &response.status_line,
        response.content_type(),
        &response.body,
    )
}

/// Classifies a response from its parts.
///
/// `content_type` must be `None` when the header was absent or repeated.
/// Fails only when a JSON body cannot be read as a deploy service error.
pub fn classify(
    status: u16,
    status_line: &str,
    content_type: Option<&str>,
    body: &str,
) -> Result<ResponseClass, DeployError> {
    if status == 200 {
        return Ok(ResponseClass::Success);
    }

    let class = match content_type {
        None => ResponseClass::Status {
            status_line: status_line.to_string(),
        },
        Some(CONTENT_TYPE_XML) => ResponseClass::Gateway {
            body: body.to_string(),
        },
        Some(CONTENT_TYPE_JSON) => {
            let (kind, message) = service_error(body)?;
            ResponseClass::Service { kind, message }
        }
        Some(_) => ResponseClass::Platform {
            body: body.to_string(),
        },
    };
    Ok(class)
}

/// Reads a deploy service error body into `"<message>:\n - <detail>"`.
fn service_error(body: &str) -> Result<(ServiceErrorKind, String), DeployError> {
    let root: Value = serde_json::from_str(body)?;
    let message = root
        .get("message")
        .map(as_text)
        .ok_or_else(|| DeployError::MalformedResponse("missing `message` field".into()))?;

    let (kind, detail) = if message.contains(INVALID_PARAMETERS) {
        let errors = root.get("requestErrors").ok_or_else(|| {
            DeployError::MalformedResponse("missing `requestErrors` field".into())
        })?;
        (ServiceErrorKind::InvalidParameters, request_error_lines(errors))
    } else if message.contains(DEPLOYMENT_FAILURE) {
        let detail = root
            .get("deployments")
            .and_then(|d| find_field(d, "message"))
            .map(as_text)
            .ok_or_else(|| {
                DeployError::MalformedResponse("no `message` under `deployments`".into())
            })?;
        (ServiceErrorKind::DeploymentFailure, detail)
    } else {
        (ServiceErrorKind::Other, String::new())
    };

    Ok((kind, format!("{message}:\n - {detail}")))
}

/// One `"<param>: <problem>\n"` line per entry, in document order.
fn request_error_lines(errors: &Value) -> String {
    let mut lines = String::new();
    if let Value::Object(map) = errors {
        for (param, problem) in map {
            let _ = writeln!(lines, "{param}: {}", as_text(problem));
        }
    }
    lines
}
