use crate::core::paths::{normalize, RootDir};
use crate::domain::model::{ArchiveOutcome, ArchiveRequest};
use crate::utils::error::{ArchiveError, Result};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

/// A file queued for the archive along with the name it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name_in_archive: String,
}

/// Builds deflate zip archives next to the first selected path.
#[derive(Debug, Clone)]
pub struct Archiver {
    root: RootDir,
}

impl Archiver {
    pub fn new(root: RootDir) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &RootDir {
        &self.root
    }

    pub fn create_archive(&self, request: &ArchiveRequest) -> Result<ArchiveOutcome> {
        let archive_name = request
            .archive_name
            .as_deref()
            .filter(|name| !name.is_empty());
        let (Some(archive_name), Some(first_path)) = (archive_name, request.paths.first()) else {
            tracing::error!("[ZIP] Missing parameters");
            return Err(ArchiveError::missing_input("Missing archive name or paths"));
        };
        self.check_archive_name(archive_name)?;

        tracing::debug!("[ZIP] Root dir: {}", self.root.path().display());

        // The archive always lands in the first item's parent, file or folder.
        // A first path naming the root itself keeps the archive in the root.
        let first = self.root.resolve(first_path)?;
        let archive_dir = if normalize(&first) == self.root.path() {
            first
        } else {
            first.parent().map(Path::to_path_buf).unwrap_or(first)
        };
        let archive_path = self.root.ensure_contained(archive_dir.join(archive_name))?;
        tracing::debug!("[ZIP] Archive will be created at: {}", archive_path.display());

        let sources = request
            .paths
            .iter()
            .map(|p| self.root.resolve(p))
            .collect::<Result<Vec<_>>>()?;

        let mut entries = Vec::new();
        for source in &sources {
            collect_entries(source, &mut entries)?;
        }
        let archive_key = normalize(&archive_path);
        entries.retain(|entry| normalize(&entry.path) != archive_key);
        let entries = dedup_entries(entries);

        let file_count = write_archive(&archive_path, &entries)?;
        tracing::debug!(
            "[ZIP] Archive created with {} files at {}",
            file_count,
            archive_path.display()
        );

        Ok(ArchiveOutcome {
            relative_path: self.root.relative(&archive_path),
            archive_path,
            file_count,
        })
    }

    fn check_archive_name(&self, archive_name: &str) -> Result<()> {
        if !self.root.enforces_containment() {
            return Ok(());
        }
        let mut components = Path::new(archive_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => Err(ArchiveError::invalid_request(format!(
                "Archive name must be a plain file name: {}",
                archive_name
            ))),
        }
    }
}

/// Queues `source` for archiving.
///
/// A regular file is stored under its base name. A directory is walked and
/// each file below it is stored as `<dir name>/<path inside dir>`. Anything
/// else (missing paths, sockets, ...) is skipped.
pub fn collect_entries(source: &Path, entries: &mut Vec<FileEntry>) -> Result<()> {
    if source.is_file() {
        let name = base_name(source);
        tracing::debug!("[ZIP] Adding file: {}", name);
        entries.push(FileEntry {
            path: source.to_path_buf(),
            name_in_archive: name,
        });
    } else if source.is_dir() {
        let prefix = base_name(source);
        walk_dir(source, &prefix, entries)?;
    } else {
        tracing::warn!("[ZIP] Skipping missing path: {}", source.display());
    }
    Ok(())
}

fn walk_dir(dir: &Path, prefix: &str, entries: &mut Vec<FileEntry>) -> Result<()> {
    let mut children = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    children.sort_by_key(|entry| entry.file_name());

    for child in children {
        let path = child.path();
        let name = format!("{}/{}", prefix, child.file_name().to_string_lossy());
        let file_type = child.file_type()?;

        // Symlinked directories are not descended into; symlinked files are
        // stored with their target's content.
        if file_type.is_dir() {
            walk_dir(&path, &name, entries)?;
        } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
            tracing::debug!("[ZIP] Adding: {}", name);
            entries.push(FileEntry {
                path,
                name_in_archive: name,
            });
        }
    }
    Ok(())
}

/// Keeps the first entry for each archive name; zip names must be unique.
fn dedup_entries(entries: Vec<FileEntry>) -> Vec<FileEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| {
            let first = seen.insert(entry.name_in_archive.clone());
            if !first {
                tracing::warn!(
                    "[ZIP] Skipping duplicate entry {} from {}",
                    entry.name_in_archive,
                    entry.path.display()
                );
            }
            first
        })
        .collect()
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn entry_options(size: u64) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(size >= u64::from(u32::MAX))
}

/// Writes `entries` into a new zip at `archive_path`, returning how many were
/// stored. A failure part way leaves the partial file behind.
fn write_archive(archive_path: &Path, entries: &[FileEntry]) -> Result<usize> {
    let file = File::create(archive_path)?;
    let mut zip = ZipWriter::new(file);

    for entry in entries {
        let mut source = File::open(&entry.path)?;
        let size = source.metadata()?.len();
        zip.start_file(entry.name_in_archive.as_str(), entry_options(size))?;
        io::copy(&mut source, &mut zip)?;
    }

    zip.finish()?;
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn archiver(dir: &TempDir) -> Archiver {
        Archiver::new(RootDir::new(dir.path(), true).unwrap())
    }

    fn request(name: &str, paths: &[&str]) -> ArchiveRequest {
        ArchiveRequest {
            archive_name: Some(name.to_string()),
            paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn entry_names(path: &Path) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_single_file_is_flattened_into_parent_of_its_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a/b.txt"), b"hello").unwrap();

        let outcome = archiver(&dir)
            .create_archive(&request("out.zip", &["a/b.txt"]))
            .unwrap();

        assert_eq!(outcome.archive_path, dir.path().join("a/out.zip"));
        assert_eq!(outcome.relative_path, "a/out.zip");
        assert_eq!(outcome.file_count, 1);
        assert_eq!(outcome.message(), "Created archive with 1 files");
        assert_eq!(entry_names(&outcome.archive_path), vec!["b.txt"]);
    }

    #[test]
    fn test_directory_keeps_subtree_under_its_name() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs/sub")).unwrap();
        fs::create_dir_all(dir.path().join("docs/empty")).unwrap();
        fs::write(dir.path().join("docs/x.txt"), b"x").unwrap();
        fs::write(dir.path().join("docs/sub/y.txt"), b"y").unwrap();

        let outcome = archiver(&dir)
            .create_archive(&request("docs.zip", &["docs"]))
            .unwrap();

        assert_eq!(outcome.archive_path, dir.path().join("docs.zip"));
        assert_eq!(outcome.file_count, 2);
        assert_eq!(
            entry_names(&outcome.archive_path),
            vec!["docs/sub/y.txt", "docs/x.txt"]
        );
    }

    #[test]
    fn test_entries_are_deflated_and_contents_preserved() {
        let dir = TempDir::new().unwrap();
        let body = "line\n".repeat(500);
        fs::write(dir.path().join("notes.txt"), &body).unwrap();

        let outcome = archiver(&dir)
            .create_archive(&request("notes.zip", &["notes.txt"]))
            .unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&outcome.archive_path).unwrap()).unwrap();
        let mut entry = archive.by_name("notes.txt").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, body);
    }

    #[test]
    fn test_missing_name_or_paths_is_client_error_and_creates_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        let archiver = archiver(&dir);

        let no_paths = archiver.create_archive(&request("out.zip", &[])).unwrap_err();
        assert!(matches!(no_paths, ArchiveError::MissingInput { .. }));
        assert_eq!(no_paths.to_string(), "Missing archive name or paths");

        let empty_name = archiver.create_archive(&request("", &["a.txt"])).unwrap_err();
        assert!(matches!(empty_name, ArchiveError::MissingInput { .. }));

        let no_name = ArchiveRequest {
            archive_name: None,
            paths: vec!["a.txt".to_string()],
        };
        assert!(archiver.create_archive(&no_name).is_err());
        assert!(!dir.path().join("out.zip").exists());
    }

    #[test]
    fn test_flattened_name_clash_keeps_first_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("a/x.txt"), b"from a").unwrap();
        fs::write(dir.path().join("b/x.txt"), b"from b").unwrap();

        let outcome = archiver(&dir)
            .create_archive(&request("out.zip", &["a/x.txt", "b/x.txt"]))
            .unwrap();

        assert_eq!(outcome.file_count, 1);
        assert_eq!(entry_names(&outcome.archive_path), vec!["x.txt"]);
        let mut archive = zip::ZipArchive::new(File::open(&outcome.archive_path).unwrap()).unwrap();
        let mut content = String::new();
        archive
            .by_name("x.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "from a");
    }

    #[test]
    fn test_repeated_directory_is_stored_once() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/sub")).unwrap();
        fs::write(dir.path().join("a/one.txt"), b"1").unwrap();
        fs::write(dir.path().join("a/sub/two.txt"), b"2").unwrap();

        let outcome = archiver(&dir)
            .create_archive(&request("out.zip", &["a", "a"]))
            .unwrap();

        assert_eq!(outcome.archive_path, dir.path().join("out.zip"));
        assert_eq!(outcome.file_count, 2);
        assert_eq!(
            entry_names(&outcome.archive_path),
            vec!["a/one.txt", "a/sub/two.txt"]
        );
    }

    #[test]
    fn test_root_as_first_path_archives_into_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/x.txt"), b"x").unwrap();

        let outcome = archiver(&dir)
            .create_archive(&request("all.zip", &[".", "docs"]))
            .unwrap();

        assert_eq!(outcome.archive_path, dir.path().join("all.zip"));
        assert_eq!(outcome.relative_path, "all.zip");
        assert!(entry_names(&outcome.archive_path).contains(&"docs/x.txt".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_followed_and_symlinked_dirs_skipped() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("target.txt"), b"linked bytes").unwrap();
        fs::create_dir(outside.path().join("elsewhere")).unwrap();
        fs::write(outside.path().join("elsewhere/hidden.txt"), b"h").unwrap();

        fs::create_dir(dir.path().join("proj")).unwrap();
        fs::write(dir.path().join("proj/real.txt"), b"real").unwrap();
        symlink(outside.path().join("target.txt"), dir.path().join("proj/link.txt")).unwrap();
        symlink(outside.path().join("elsewhere"), dir.path().join("proj/linkdir")).unwrap();

        let outcome = archiver(&dir)
            .create_archive(&request("proj.zip", &["proj"]))
            .unwrap();

        assert_eq!(
            entry_names(&outcome.archive_path),
            vec!["proj/link.txt", "proj/real.txt"]
        );
        let mut archive = zip::ZipArchive::new(File::open(&outcome.archive_path).unwrap()).unwrap();
        let mut content = String::new();
        archive
            .by_name("proj/link.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "linked bytes");
    }

    #[test]
    fn test_missing_sources_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();

        let outcome = archiver(&dir)
            .create_archive(&request("out.zip", &["a.txt", "ghost.txt"]))
            .unwrap();

        assert_eq!(outcome.file_count, 1);
        assert_eq!(entry_names(&outcome.archive_path), vec!["a.txt"]);
    }

    #[test]
    fn test_archive_does_not_include_itself() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("proj")).unwrap();
        fs::write(dir.path().join("proj/main.py"), b"print()").unwrap();

        // First path's parent is `proj/`, which is also being walked.
        let outcome = archiver(&dir)
            .create_archive(&request("proj.zip", &["proj/main.py", "proj"]))
            .unwrap();

        assert_eq!(outcome.archive_path, dir.path().join("proj/proj.zip"));
        assert_eq!(
            entry_names(&outcome.archive_path),
            vec!["main.py", "proj/main.py"]
        );
    }

    #[test]
    fn test_escaping_paths_rejected() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("inner")).unwrap();
        let archiver = Archiver::new(RootDir::new(dir.path().join("inner"), true).unwrap());

        let err = archiver
            .create_archive(&request("out.zip", &["../outside.txt"]))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::PathEscapesRoot { .. }));

        let err = archiver
            .create_archive(&request("../out.zip", &["x.txt"]))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidRequest { .. }));
        assert!(!dir.path().join("out.zip").exists());
    }

    #[test]
    fn test_unwritable_destination_is_operational_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        let archiver = Archiver::new(RootDir::new(dir.path(), false).unwrap());

        let err = archiver
            .create_archive(&request("missing_dir/out.zip", &["a.txt"]))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::IoError(_)));
        assert_eq!(err.status_code(), 500);
    }
}
