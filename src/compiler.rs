use std::env;
use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::model::layout::COMPILER_NAME;
use crate::model::runtime::CompilerRuntime;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("protoc: not found")]
    NotFound,
    #[error("protoc: invalid executable {}", .0.display())]
    Invalid(PathBuf),
    #[error("{output}")]
    Failed { target: String, output: String },
    #[error("protoc: {0}")]
    Io(#[from] std::io::Error),
}

/// A protoc executable that answered `--version`.
#[derive(Debug, Clone)]
pub struct Compiler {
    pub version: String,
    path: PathBuf,
}

impl Compiler {
    /// Validate `path` as a compiler by probing its version.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, CompilerError> {
        let path = path.into();
        if path.as_os_str().is_empty() || !path.is_file() {
            return Err(CompilerError::Invalid(path));
        }

        match Command::new(&path).arg("--version").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok(Self { version, path })
            }
            Ok(output) => {
                tracing::debug!(path = %path.display(), status = %output.status, "version probe failed");
                Err(CompilerError::Invalid(path))
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), "version probe could not run: {err}");
                Err(CompilerError::Invalid(path))
            }
        }
    }

    /// Look protoc up on `PATH`.
    pub fn system() -> Result<Self, CompilerError> {
        Self::system_in(search_path())
    }

    fn system_in(dirs: impl IntoIterator<Item = PathBuf>) -> Result<Self, CompilerError> {
        let path = find_executable_in(COMPILER_NAME, dirs).ok_or(CompilerError::NotFound)?;
        Self::new(path)
    }

    /// Prefer the installed compiler unless `use_system` is set or it is
    /// unusable, then look in `dirs` (normally [`search_path`]).
    pub fn resolve_in(
        embedded: &Path,
        use_system: bool,
        dirs: impl IntoIterator<Item = PathBuf>,
    ) -> Result<Self, CompilerError> {
        if !use_system {
            match Self::new(embedded) {
                Ok(compiler) => return Ok(compiler),
                Err(err) => tracing::warn!("embedded compiler unusable, trying PATH: {err}"),
            }
        }
        Self::system_in(dirs)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run protoc for one target. A non-zero exit carries the captured output.
    pub fn compile(&self, target: &str, runtime: &CompilerRuntime) -> Result<(), CompilerError> {
        let args = runtime.build(target);
        tracing::debug!(compiler = %self.path.display(), ?args, "invoking protoc");

        let output = Command::new(&self.path).args(&args).output()?;
        if output.status.success() {
            return Ok(());
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let combined = combined.trim().to_string();
        Err(CompilerError::Failed {
            target: target.to_string(),
            output: if combined.is_empty() {
                format!("protoc exited with {}", output.status)
            } else {
                combined
            },
        })
    }
}

/// Search `PATH` for an executable named `name` (plus the platform suffix).
pub fn find_executable(name: &str) -> Option<PathBuf> {
    find_executable_in(name, search_path())
}

/// Directories listed in `PATH`.
pub fn search_path() -> Vec<PathBuf> {
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).collect())
        .unwrap_or_default()
}

pub fn find_executable_in(
    name: &str,
    dirs: impl IntoIterator<Item = PathBuf>,
) -> Option<PathBuf> {
    let file_name = format!("{name}{EXE_SUFFIX}");
    dirs.into_iter()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(&file_name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
