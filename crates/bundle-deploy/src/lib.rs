//! CICS bundle deployment over the managed bundles HTTP endpoint.
//!
//! This crate implements the **deploy call** only: it uploads a bundle
//! archive plus its target metadata to `<endpoint>/managedcicsbundles` and
//! turns the response into success or a single error message. Argument
//! collection and credential storage belong to the caller — the CLI in
//! `apps/deploy-cli` is one such caller.
//!
//! # Pipeline
//!
//! 1. **Build** — compose the target URL, the multipart form and the
//!    basic-auth header
//! 2. **Check** — refuse to send when the bundle file is missing
//! 3. **Send** — hand the upload to a [`Transport`]
//! 4. **Classify** — map status and content type to a [`ResponseClass`]

pub mod classifier;
pub mod deploy;
pub mod error;
pub mod json;
pub mod request;
pub mod target;
pub mod transport;
pub mod types;

// Re-export primary types for convenience.
pub use classifier::{RejectionLayer, ResponseClass, ServiceErrorKind, classify, classify_response};
pub use deploy::{BundleDeployer, deploy_bundle};
pub use error::DeployError;
pub use request::build_upload;
pub use target::{deploy_target, parse_endpoint};
pub use transport::{HttpTransport, HttpTransportConfig, Transport};
pub use types::{
    Credentials, DEPLOY_PATH_SEGMENT, DeployRequest, FormPart, HttpResponse, PartBody,
    UploadRequest,
};
