use crate::error::ToolError;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// A relative path whose resolved form leaves the sandbox root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("path {path:?} escapes the working directory")]
pub struct PathEscape {
    pub path: String,
}

/// Resolve `relative` against `working_directory` and require the result to
/// stay at or below it.
///
/// Purely lexical: `.` and `..` are folded without touching the filesystem,
/// so symbolic links are not followed here. See [`Sandbox::confine`] for the
/// link-aware variant used by the tools.
pub fn resolve(working_directory: &Path, relative: &str) -> Result<PathBuf, PathEscape> {
    let root = normalize(working_directory);
    let resolved = normalize(&root.join(relative));

    // Component-wise prefix: `/work2` is not inside `/work`.
    if resolved == root || resolved.starts_with(&root) {
        Ok(resolved)
    } else {
        Err(PathEscape {
            path: relative.to_string(),
        })
    }
}

/// Lexically normalize an absolute path (`os.path.abspath` semantics).
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// The fixed working directory every tool operates in.
///
/// Built once at startup and shared read-only for the life of the process.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
    reject_symlink_escapes: bool,
}

impl Sandbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: normalize(&root.into()),
            reject_symlink_escapes: true,
        }
    }

    pub fn with_symlink_checks(mut self, enabled: bool) -> Self {
        self.reject_symlink_escapes = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn rejects_symlink_escapes(&self) -> bool {
        self.reject_symlink_escapes
    }

    pub fn resolve(&self, relative: &str) -> Result<PathBuf, PathEscape> {
        resolve(&self.root, relative)
    }

    /// Resolve a model-supplied path for `action`, mapping escapes to the
    /// model-visible sandbox error.
    ///
    /// With symlink checks enabled, the nearest existing ancestor of the
    /// target is canonicalized and must still live under the canonical root.
    pub async fn confine(&self, relative: &str, action: &'static str) -> Result<PathBuf, ToolError> {
        let violation = || ToolError::SandboxViolation {
            action,
            path: relative.to_string(),
        };

        if relative.contains('\0') {
            return Err(ToolError::InvalidArguments(
                "path must not contain NUL bytes".to_string(),
            ));
        }

        let resolved = self.resolve(relative).map_err(|_| violation())?;

        if self.reject_symlink_escapes && !self.resolves_inside(&resolved).await {
            tracing::debug!(path = relative, "symlink escape rejected");
            return Err(violation());
        }

        Ok(resolved)
    }

    async fn resolves_inside(&self, resolved: &Path) -> bool {
        let root = tokio::fs::canonicalize(&self.root)
            .await
            .unwrap_or_else(|_| self.root.clone());

        let mut target = resolved.to_path_buf();
        for _ in 0..MAX_SYMLINK_HOPS {
            match Self::real_location(&target).await {
                Location::Real(real) => return real.starts_with(&root),
                Location::Dangling(next) => target = next,
                Location::Unresolvable => return false,
            }
        }
        false
    }

    /// Where `target` lands once its nearest existing ancestor is resolved.
    /// A dangling link yields the path it points at.
    async fn real_location(target: &Path) -> Location {
        for current in target.ancestors() {
            let Ok(meta) = tokio::fs::symlink_metadata(current).await else {
                continue;
            };
            if let Ok(real) = tokio::fs::canonicalize(current).await {
                return Location::Real(real);
            }
            if !meta.file_type().is_symlink() {
                return Location::Unresolvable;
            }
            let (Ok(link), Some(parent)) = (tokio::fs::read_link(current).await, current.parent())
            else {
                return Location::Unresolvable;
            };
            let base = tokio::fs::canonicalize(parent)
                .await
                .unwrap_or_else(|_| parent.to_path_buf());
            let mut next = normalize(&base.join(link));
            if let Ok(rest) = target.strip_prefix(current)
                && !rest.as_os_str().is_empty()
            {
                next.push(rest);
            }
            return Location::Dangling(next);
        }
        Location::Real(target.to_path_buf())
    }
}

const MAX_SYMLINK_HOPS: usize = 40;

enum Location {
    Real(PathBuf),
    Dangling(PathBuf),
    Unresolvable,
}
