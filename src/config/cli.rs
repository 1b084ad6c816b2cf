use crate::config::toml_config::TomlConfig;
use crate::config::ServiceConfig;
use crate::domain::model::ExtractConflictPolicy;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "zip-shelf")]
#[command(about = "Serve zip/unzip endpoints over a notebook root directory")]
pub struct CliConfig {
    /// Directory all client paths are resolved against
    #[arg(long)]
    pub root_dir: Option<PathBuf>,

    /// Listen address [default: 127.0.0.1:8888]
    #[arg(long)]
    pub addr: Option<SocketAddr>,

    /// URL prefix the endpoints are mounted under [default: /]
    #[arg(long)]
    pub base_url: Option<String>,

    /// TOML configuration file; flags given here override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// What extraction does when the target directory already exists [default: merge]
    #[arg(long, value_enum)]
    pub on_conflict: Option<ExtractConflictPolicy>,

    /// Accept client paths that resolve outside the root directory
    #[arg(long)]
    pub allow_outside_root: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Defaults, then the TOML file, then explicit flags.
    pub fn resolve(&self) -> Result<ServiceConfig> {
        let mut config = ServiceConfig::default();

        if let Some(path) = &self.config {
            tracing::debug!("Loading configuration from {}", path.display());
            let file_config = TomlConfig::from_file(path)?;
            file_config.validate()?;
            config = file_config.apply_to(config)?;
        }

        if let Some(root_dir) = &self.root_dir {
            config.root_dir = root_dir.clone();
        }
        if let Some(addr) = self.addr {
            config.addr = addr;
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(policy) = self.on_conflict {
            config.on_conflict = policy;
        }
        if self.allow_outside_root {
            config.enforce_root_containment = false;
        }

        Ok(config)
    }
}
