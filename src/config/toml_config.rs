use crate::config::ServiceConfig;
use crate::domain::model::ExtractConflictPolicy;
use crate::utils::error::{ArchiveError, Result};
use crate::utils::validation::{validate_base_url, validate_path, validate_socket_addr, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerSection,
    pub extract: ExtractSection,
    pub security: SecuritySection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub root_dir: Option<String>,
    pub addr: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractSection {
    pub on_conflict: Option<ExtractConflictPolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub enforce_root_containment: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ArchiveError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ArchiveError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NOTEBOOK_ROOT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ArchiveError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Layers the values present in this file over `base`.
    pub fn apply_to(&self, base: ServiceConfig) -> Result<ServiceConfig> {
        let mut config = base;
        if let Some(root_dir) = &self.server.root_dir {
            config.root_dir = PathBuf::from(root_dir);
        }
        if let Some(addr) = &self.server.addr {
            config.addr = validate_socket_addr("server.addr", addr)?;
        }
        if let Some(base_url) = &self.server.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(policy) = self.extract.on_conflict {
            config.on_conflict = policy;
        }
        if let Some(enforce) = self.security.enforce_root_containment {
            config.enforce_root_containment = enforce;
        }
        Ok(config)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(root_dir) = &self.server.root_dir {
            validate_path("server.root_dir", root_dir)?;
        }
        if let Some(addr) = &self.server.addr {
            validate_socket_addr("server.addr", addr)?;
        }
        if let Some(base_url) = &self.server.base_url {
            validate_base_url("server.base_url", base_url)?;
        }
        Ok(())
    }
}
