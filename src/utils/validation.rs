use crate::utils::error::{ArchiveError, Result};
use std::net::SocketAddr;
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ArchiveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ArchiveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_directory(field_name: &str, path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(ArchiveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.display().to_string(),
            reason: "Directory does not exist".to_string(),
        });
    }
    Ok(())
}

pub fn validate_socket_addr(field_name: &str, value: &str) -> Result<SocketAddr> {
    value
        .parse()
        .map_err(|e| ArchiveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Invalid listen address: {}", e),
        })
}

pub fn validate_base_url(field_name: &str, value: &str) -> Result<()> {
    if !value.starts_with('/') {
        return Err(ArchiveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Base URL must start with '/'".to_string(),
        });
    }
    if value.contains(char::is_whitespace) {
        return Err(ArchiveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Base URL cannot contain whitespace".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("server.root_dir", "~/notebooks").is_ok());
        assert!(validate_path("server.root_dir", "").is_err());
        assert!(validate_path("server.root_dir", "a\0b").is_err());
    }

    #[test]
    fn test_validate_socket_addr() {
        let addr = validate_socket_addr("server.addr", "127.0.0.1:8888").unwrap();
        assert_eq!(addr.port(), 8888);
        assert!(validate_socket_addr("server.addr", "localhost").is_err());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("server.base_url", "/").is_ok());
        assert!(validate_base_url("server.base_url", "/user/alice/").is_ok());
        assert!(validate_base_url("server.base_url", "user").is_err());
        assert!(validate_base_url("server.base_url", "/a b").is_err());
    }

    #[test]
    fn test_validate_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(validate_directory("server.root_dir", dir.path()).is_ok());
        assert!(validate_directory("server.root_dir", &dir.path().join("missing")).is_err());
    }
}
