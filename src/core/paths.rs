use crate::utils::error::{ArchiveError, Result};
use std::path::{Component, Path, PathBuf};

/// The server root every client path is anchored to.
///
/// Client paths are `~`-expanded, then used as-is when absolute or joined
/// onto the root otherwise. With containment enforced, a resolved path that
/// normalises to somewhere outside the root is rejected. The check is
/// lexical only: a symlink under the root pointing elsewhere is followed.
#[derive(Debug, Clone)]
pub struct RootDir {
    root: PathBuf,
    enforce_containment: bool,
}

impl RootDir {
    pub fn new(root: impl AsRef<Path>, enforce_containment: bool) -> Result<Self> {
        let expanded = expand_home(root.as_ref());
        let absolute = std::path::absolute(&expanded)?;
        Ok(Self {
            root: normalize(&absolute),
            enforce_containment,
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn enforces_containment(&self) -> bool {
        self.enforce_containment
    }

    pub fn resolve(&self, client_path: &str) -> Result<PathBuf> {
        let expanded = expand_home(Path::new(client_path));
        let joined = if expanded.is_absolute() {
            expanded
        } else {
            self.root.join(expanded)
        };
        self.ensure_contained(normalize(&joined))
    }

    /// Passes `path` through unchanged unless containment is on and it lies
    /// outside the root.
    pub fn ensure_contained(&self, path: PathBuf) -> Result<PathBuf> {
        if self.enforce_containment && !normalize(&path).starts_with(&self.root) {
            tracing::warn!("Rejected path outside root: {}", path.display());
            return Err(ArchiveError::PathEscapesRoot {
                path: path.display().to_string(),
            });
        }
        Ok(path)
    }

    /// `path` relative to the root, with `..` segments when it lies outside.
    pub fn relative(&self, path: &Path) -> String {
        let target = normalize(path);
        let root: Vec<Component> = self.root.components().collect();
        let target_parts: Vec<Component> = target.components().collect();

        let common = root
            .iter()
            .zip(target_parts.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut relative = PathBuf::new();
        for _ in common..root.len() {
            relative.push("..");
        }
        for part in &target_parts[common..] {
            relative.push(part.as_os_str());
        }

        if relative.as_os_str().is_empty() {
            ".".to_string()
        } else {
            relative.to_string_lossy().into_owned()
        }
    }
}

/// Replaces a leading `~` component with the current user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) if rest.as_os_str().is_empty() => home,
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Lexically removes `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
