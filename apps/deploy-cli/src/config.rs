//! Deploy profile configuration.
//!
//! Settings come from three places, highest precedence first:
//! - command-line flags (the password may also come from
//!   `CICS_BUNDLE_DEPLOY_PASSWORD`)
//! - the profile file given with `--config`, or the default
//!   `~/.config/cicsbundle/deploy.toml` when it exists
//! - derived defaults (`bunddef` from the bundle file stem)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

use cicsbundle_deploy::{Credentials, DeployRequest, HttpTransportConfig, parse_endpoint};
use url::Url;

/// A partial set of deploy settings, as read from a profile or flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    pub endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub bunddef: Option<String>,
    pub csdgroup: Option<String>,
    pub cicsplex: Option<String>,
    pub region: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Profile {
    /// Reads a TOML profile file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Reads the default profile, or returns an empty one when absent.
    pub fn load_default() -> anyhow::Result<Self> {
        match default_profile_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading default profile");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Returns `self` with every value set in `top` replaced.
    pub fn overlay(self, top: Profile) -> Profile {
        Profile {
            endpoint: top.endpoint.or(self.endpoint),
            username: top.username.or(self.username),
            password: top.password.or(self.password),
            bunddef: top.bunddef.or(self.bunddef),
            csdgroup: top.csdgroup.or(self.csdgroup),
            cicsplex: top.cicsplex.or(self.cicsplex),
            region: top.region.or(self.region),
            timeout_secs: top.timeout_secs.or(self.timeout_secs),
        }
    }
}

/// Fully resolved settings for one deploy run.
#[derive(Debug, Clone)]
pub struct DeploySettings {
    pub endpoint: Url,
    pub bundle: PathBuf,
    pub bunddef: String,
    pub csdgroup: String,
    pub cicsplex: String,
    pub region: String,
    pub credentials: Credentials,
    pub timeout: Option<Duration>,
}

impl DeploySettings {
    /// Resolves a merged profile against the bundle path.
    pub fn resolve(bundle: PathBuf, profile: Profile) -> anyhow::Result<Self> {
        let endpoint = required(profile.endpoint, "endpoint")?;
        let endpoint = parse_endpoint(&endpoint)?;

        let bunddef = match profile.bunddef {
            Some(name) => name,
            None => bundle_stem(&bundle)?,
        };

        Ok(Self {
            endpoint,
            bunddef,
            csdgroup: required(profile.csdgroup, "csdgroup")?,
            cicsplex: required(profile.cicsplex, "cicsplex")?,
            region: required(profile.region, "region")?,
            credentials: Credentials::new(
                required(profile.username, "username")?,
                required(profile.password, "password")?,
            ),
            timeout: profile.timeout_secs.map(Duration::from_secs),
            bundle,
        })
    }

    pub fn request(&self) -> DeployRequest {
        DeployRequest::new(
            self.endpoint.clone(),
            self.bundle.clone(),
            self.credentials.clone(),
        )
        .with_bunddef(&self.bunddef)
        .with_csdgroup(&self.csdgroup)
        .with_cicsplex(&self.cicsplex)
        .with_region(&self.region)
    }

    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            timeout: self.timeout,
            user_agent: Some(format!("cicsbundle-deploy/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

fn required(value: Option<String>, key: &str) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None => bail!("missing required setting `{key}` (pass --{key} or set it in the profile)"),
    }
}

fn bundle_stem(bundle: &Path) -> anyhow::Result<String> {
    bundle
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .with_context(|| {
            format!(
                "cannot derive a bundle definition name from {}; pass --bunddef",
                bundle.display()
            )
        })
}

/// Returns `<config dir>/cicsbundle/deploy.toml`.
pub fn default_profile_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("cicsbundle").join("deploy.toml"))
}

/// Returns the platform-specific config directory.
fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_profile() -> Profile {
        Profile {
            endpoint: Some("https://cics.example.com:9443".into()),
            username: Some("deployer".into()),
            password: Some("s3cret".into()),
            bunddef: None,
            csdgroup: Some("PAYGRP".into()),
            cicsplex: Some("PLEX1".into()),
            region: Some("IYK2ZAB1".into()),
            timeout_secs: Some(120),
        }
    }

    #[test]
    fn load_profile_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.toml");
        std::fs::write(
            &path,
            r#"
endpoint = "http://cics:9080/api"
username = "deployer"
cicsplex = "PLEX1"
region = "IYK2ZAB1"
timeout_secs = 30
"#,
        )
        .unwrap();

        let profile = Profile::load(&path).unwrap();
        assert_eq!(profile.endpoint.as_deref(), Some("http://cics:9080/api"));
        assert_eq!(profile.timeout_secs, Some(30));
        assert_eq!(profile.password, None);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.toml");
        std::fs::write(&path, "endpiont = \"http://typo\"\n").unwrap();
        let err = Profile::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
    }

    #[test]
    fn missing_file_is_error_when_explicit() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Profile::load(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn overlay_prefers_top_values() {
        let base = full_profile();
        let top = Profile {
            region: Some("OTHER".into()),
            password: Some("from-env".into()),
            ..Default::default()
        };
        let merged = base.overlay(top);
        assert_eq!(merged.region.as_deref(), Some("OTHER"));
        assert_eq!(merged.password.as_deref(), Some("from-env"));
        assert_eq!(merged.cicsplex.as_deref(), Some("PLEX1"));
    }

    #[test]
    fn resolve_derives_bunddef_from_stem() {
        let settings =
            DeploySettings::resolve(PathBuf::from("target/payroll-1.0.zip"), full_profile())
                .unwrap();
        assert_eq!(settings.bunddef, "payroll-1.0");
        assert_eq!(settings.timeout, Some(Duration::from_secs(120)));

        let request = settings.request();
        assert_eq!(request.endpoint.as_str(), "https://cics.example.com:9443/");
        assert_eq!(request.credentials.password(), "s3cret");
        assert_eq!(request.region, "IYK2ZAB1");
    }

    #[test]
    fn resolve_keeps_explicit_bunddef() {
        let mut profile = full_profile();
        profile.bunddef = Some("PAYDEF".into());
        let settings = DeploySettings::resolve(PathBuf::from("x.zip"), profile).unwrap();
        assert_eq!(settings.bunddef, "PAYDEF");
    }

    #[test]
    fn resolve_reports_missing_key() {
        let mut profile = full_profile();
        profile.cicsplex = None;
        let err = DeploySettings::resolve(PathBuf::from("x.zip"), profile).unwrap_err();
        assert!(err.to_string().contains("`cicsplex`"), "{err}");
    }

    #[test]
    fn resolve_rejects_bad_endpoint() {
        let mut profile = full_profile();
        profile.endpoint = Some("::not a url".into());
        assert!(DeploySettings::resolve(PathBuf::from("x.zip"), profile).is_err());
    }

    #[test]
    fn settings_debug_hides_password() {
        let settings = DeploySettings::resolve(PathBuf::from("x.zip"), full_profile()).unwrap();
        assert!(!format!("{settings:?}").contains("s3cret"));
    }

    #[test]
    fn transport_config_carries_timeout() {
        let settings = DeploySettings::resolve(PathBuf::from("x.zip"), full_profile()).unwrap();
        let config = settings.transport_config();
        assert_eq!(config.timeout, Some(Duration::from_secs(120)));
        assert!(config.user_agent.unwrap().starts_with("cicsbundle-deploy/"));
    }
}
