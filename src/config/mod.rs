#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::paths::RootDir;
use crate::domain::model::ExtractConflictPolicy;
use crate::utils::error::Result;
use crate::utils::validation::{validate_base_url, validate_directory, Validate};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;

pub const DEFAULT_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8888));

/// Settings the service is started with, after file and flag overrides.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub root_dir: PathBuf,
    pub addr: SocketAddr,
    /// URL prefix the routes are mounted under.
    pub base_url: String,
    pub on_conflict: ExtractConflictPolicy,
    pub enforce_root_containment: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            addr: DEFAULT_ADDR,
            base_url: "/".to_string(),
            on_conflict: ExtractConflictPolicy::default(),
            enforce_root_containment: true,
        }
    }
}

impl ServiceConfig {
    pub fn root(&self) -> Result<RootDir> {
        RootDir::new(&self.root_dir, self.enforce_root_containment)
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        let root = self.root()?;
        validate_directory("server.root_dir", root.path())?;
        validate_base_url("server.base_url", &self.base_url)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binds_loopback() {
        let config = ServiceConfig::default();
        assert_eq!(config.addr, DEFAULT_ADDR);
        assert_eq!(config.addr.to_string(), "127.0.0.1:8888");
        assert!(config.addr.ip().is_loopback());
    }

    #[test]
    fn test_validate_requires_existing_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = ServiceConfig {
            root_dir: dir.path().to_path_buf(),
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_ok());

        config.root_dir = dir.path().join("nope");
        assert!(config.validate().is_err());
    }
}
