//! The deploy call: build, check, send, classify.

use tracing::{debug, info, warn};

use crate::classifier::classify_response;
use crate::error::DeployError;
use crate::request::build_upload;
use crate::transport::{HttpTransport, Transport};
use crate::types::DeployRequest;

/// Deploys one bundle through `transport`.
///
/// Returns `Ok(())` only for a 200 response. A missing bundle fails with
/// `DeployError::BundleMissing` before the transport is touched; every other
/// status becomes `DeployError::Rejected` carrying the layer-specific message.
pub async fn deploy_bundle(
    transport: &dyn Transport,
    request: &DeployRequest,
) -> Result<(), DeployError> {
    let upload = build_upload(request)?;

    match tokio::fs::try_exists(&request.bundle).await {
        Ok(true) => {}
        Ok(false) => return Err(DeployError::BundleMissing(request.bundle.clone())),
        Err(e) => {
            debug!(error = %e, bundle = %request.bundle.display(), "bundle existence check failed");
            return Err(DeployError::BundleMissing(request.bundle.clone()));
        }
    }

    let target = upload.target.clone();
    let response = transport.execute(upload).await?;
    let class = classify_response(&response)?;

    if class.is_success() {
        info!(target_url = %target, bunddef = %request.bunddef, "bundle deployed");
    } else if let Some(layer) = class.layer() {
        warn!(
            target_url = %target,
            bunddef = %request.bunddef,
            status = response.status,
            layer = %layer,
            "bundle deployment rejected"
        );
    }

    class.into_result()
}

/// Owns a transport and runs deploy calls through it.
pub struct BundleDeployer<T: Transport = HttpTransport> {
    transport: T,
}

impl Default for BundleDeployer<HttpTransport> {
    fn default() -> Self {
        Self::new(HttpTransport::default())
    }
}

impl<T: Transport> BundleDeployer<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Deploys one bundle. See [`deploy_bundle`].
    pub async fn deploy(&self, request: &DeployRequest) -> Result<(), DeployError> {
        deploy_bundle(&self.transport, request).await
    }
}
