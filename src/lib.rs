pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::config::{toml_config::TomlConfig, ServiceConfig};
pub use crate::core::{archiver::Archiver, extractor::Extractor, paths::RootDir};
pub use crate::domain::model::{ArchiveRequest, ExtractConflictPolicy, ExtractRequest};
pub use crate::server::{router, AppState, Server};
pub use crate::utils::error::{ArchiveError, Result};
