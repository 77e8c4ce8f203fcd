//! Deploy target URL composition.

use url::Url;

use crate::error::DeployError;
use crate::types::DEPLOY_PATH_SEGMENT;

/// Parses a configured endpoint string.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, DeployError> {
    Url::parse(endpoint).map_err(|e| DeployError::InvalidTarget {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

/// Appends `managedcicsbundles` to the endpoint path.
///
/// A single `/` separator is inserted only when the path does not already
/// end in one. Scheme, user info, host, port, query and fragment are kept.
pub fn deploy_target(endpoint: &Url) -> Result<Url, DeployError> {
    if endpoint.cannot_be_a_base() {
        return Err(DeployError::InvalidTarget {
            endpoint: endpoint.to_string(),
            reason: "URL has no hierarchical path".into(),
        });
    }

    let mut path = endpoint.path().to_string();
    if !path.ends_with('/') {
        path.push('/');
    }
    path.push_str(DEPLOY_PATH_SEGMENT);

    let mut target = endpoint.clone();
    target.set_path(&path);
    Ok(target)
}
