//! `cicsbundle-deploy` entry point.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cicsbundle_deploy::{BundleDeployer, DeployError, HttpTransport};
use config::{DeploySettings, Profile};

#[derive(Parser)]
#[command(name = "cicsbundle-deploy")]
#[command(about = "Deploy a CICS bundle to a managed bundles endpoint", version)]
struct Cli {
    /// Bundle archive (.zip) to deploy
    bundle: PathBuf,

    /// Profile file (default: ~/.config/cicsbundle/deploy.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Deploy endpoint, e.g. https://cmci.example.com:9443
    #[arg(long)]
    endpoint: Option<String>,

    #[arg(long, short = 'u')]
    username: Option<String>,

    #[arg(long, env = "CICS_BUNDLE_DEPLOY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Bundle definition name (default: bundle file stem)
    #[arg(long)]
    bunddef: Option<String>,

    /// CSD group holding the bundle definition
    #[arg(long)]
    csdgroup: Option<String>,

    /// Target CICSplex
    #[arg(long)]
    cicsplex: Option<String>,

    /// Target region
    #[arg(long)]
    region: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Cli {
    fn overrides(&self) -> Profile {
        Profile {
            endpoint: self.endpoint.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            bunddef: self.bunddef.clone(),
            csdgroup: self.csdgroup.clone(),
            cicsplex: self.cicsplex.clone(),
            region: self.region.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Deploy errors already carry the full message.
            match e.downcast_ref::<DeployError>() {
                Some(deploy) => eprintln!("{deploy}"),
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let profile = match &cli.config {
        Some(path) => Profile::load(path)?,
        None => Profile::load_default()?,
    };
    let settings = DeploySettings::resolve(cli.bundle.clone(), profile.overlay(cli.overrides()))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoint = %settings.endpoint,
        bundle = %settings.bundle.display(),
        bunddef = %settings.bunddef,
        cicsplex = %settings.cicsplex,
        region = %settings.region,
        "deploying bundle"
    );

    let deployer = BundleDeployer::new(HttpTransport::new(settings.transport_config()));
    deployer.deploy(&settings.request()).await?;

    println!("Deployed {} to {}", settings.bunddef, settings.region);
    Ok(())
}
