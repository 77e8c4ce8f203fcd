//! Upload assembly: target URL, multipart parts and authorization.

use tracing::debug;

use crate::error::DeployError;
use crate::target::deploy_target;
use crate::types::{DeployRequest, FormPart, PartBody, UploadRequest};

pub const PART_BUNDLE: &str = "bundle";
pub const PART_BUNDDEF: &str = "bunddef";
pub const PART_CSDGROUP: &str = "csdgroup";
pub const PART_CICSPLEX: &str = "cicsplex";
pub const PART_REGION: &str = "region";

/// Content type declared for the bundle archive.
pub const BUNDLE_CONTENT_TYPE: &str = "application/zip";

/// Builds the upload for a deploy request.
///
/// Does not touch the filesystem; the bundle is read by the transport.
pub fn build_upload(request: &DeployRequest) -> Result<UploadRequest, DeployError> {
    let target = deploy_target(&request.endpoint)?;

    let file_name = request
        .bundle
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let parts = vec![
        FormPart {
            name: PART_BUNDLE.to_string(),
            body: PartBody::File {
                path: request.bundle.clone(),
                file_name,
                content_type: BUNDLE_CONTENT_TYPE.to_string(),
            },
        },
        FormPart::text(PART_BUNDDEF, &request.bunddef),
        FormPart::text(PART_CSDGROUP, &request.csdgroup),
        FormPart::text(PART_CICSPLEX, &request.cicsplex),
        FormPart::text(PART_REGION, &request.region),
    ];

    debug!(
        target_url = %target,
        bundle = %request.bundle.display(),
        bunddef = %request.bunddef,
        "upload assembled"
    );

    Ok(UploadRequest {
        target,
        authorization: request.credentials.basic_authorization(),
        parts,
    })
}
