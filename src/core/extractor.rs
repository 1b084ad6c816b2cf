use crate::core::paths::RootDir;
use crate::domain::model::{ExtractConflictPolicy, ExtractOutcome, ExtractRequest};
use crate::utils::error::{ArchiveError, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

const EXTRACT_SUFFIX: &str = "_extracted";

/// Unpacks a zip archive into `<stem>_extracted` beside it.
#[derive(Debug, Clone)]
pub struct Extractor {
    root: RootDir,
    on_conflict: ExtractConflictPolicy,
}

impl Extractor {
    pub fn new(root: RootDir, on_conflict: ExtractConflictPolicy) -> Self {
        Self { root, on_conflict }
    }

    pub fn on_conflict(&self) -> ExtractConflictPolicy {
        self.on_conflict
    }

    pub fn extract_archive(&self, request: &ExtractRequest) -> Result<ExtractOutcome> {
        let Some(archive_path) = request.archive_path.as_deref().filter(|p| !p.is_empty()) else {
            return Err(ArchiveError::missing_input("No archive path provided"));
        };

        tracing::debug!("[UNZIP] Root dir: {}", self.root.path().display());
        let full_archive_path = self.root.resolve(archive_path)?;
        tracing::debug!("[UNZIP] Full archive path: {}", full_archive_path.display());

        if !full_archive_path.exists() {
            tracing::error!("[UNZIP] Archive not found: {}", full_archive_path.display());
            return Err(ArchiveError::not_found("Archive not found"));
        }

        let extract_dir = self
            .root
            .ensure_contained(extraction_dir_for(&full_archive_path)?)?;
        tracing::debug!("[UNZIP] Extracting to: {}", extract_dir.display());

        // Open before touching the destination so a bad archive leaves it alone.
        let mut archive = ZipArchive::new(File::open(&full_archive_path)?)?;
        self.prepare_destination(&extract_dir)?;
        archive.extract(&extract_dir)?;

        let relative_path = self.root.relative(&extract_dir);
        tracing::debug!("[UNZIP] Extracted to: {}", relative_path);

        Ok(ExtractOutcome {
            entry_count: archive.len(),
            relative_path,
            extract_dir,
        })
    }

    fn prepare_destination(&self, extract_dir: &Path) -> Result<()> {
        if !extract_dir.exists() {
            return Ok(());
        }
        match self.on_conflict {
            ExtractConflictPolicy::Merge => {
                tracing::debug!(
                    "[UNZIP] Merging into existing {}",
                    extract_dir.display()
                );
                Ok(())
            }
            ExtractConflictPolicy::Fail => Err(ArchiveError::ExtractionConflict {
                path: self.root.relative(extract_dir),
            }),
            ExtractConflictPolicy::Replace => {
                tracing::info!("[UNZIP] Replacing existing {}", extract_dir.display());
                if extract_dir.is_dir() {
                    fs::remove_dir_all(extract_dir)?;
                } else {
                    fs::remove_file(extract_dir)?;
                }
                Ok(())
            }
        }
    }
}

/// `dir/foo.zip` becomes `dir/foo_extracted`.
pub fn extraction_dir_for(archive_path: &Path) -> Result<PathBuf> {
    let stem = archive_path.file_stem().ok_or_else(|| {
        ArchiveError::invalid_request(format!(
            "Cannot derive a name from {}",
            archive_path.display()
        ))
    })?;
    let dir_name = format!("{}{}", stem.to_string_lossy(), EXTRACT_SUFFIX);
    Ok(match archive_path.parent() {
        Some(parent) => parent.join(dir_name),
        None => PathBuf::from(dir_name),
    })
}
