use anyhow::{Result, anyhow};
use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};

/// Base name of the protobuf compiler executable.
pub const COMPILER_NAME: &str = "protoc";

/// Namespace the gogo support protos are imported under.
pub const GOGO_NAMESPACE: &str = "github.com/gogo/protobuf";

/// Paths of everything protob installs, rooted at `~/.protob`.
#[derive(Debug, Clone)]
pub struct Layout {
    home: PathBuf,
}

impl Layout {
    pub fn from_home_dir() -> Result<Self> {
        let home = directories::BaseDirs::new()
            .map(|d| d.home_dir().to_path_buf())
            .ok_or_else(|| anyhow!("cannot determine home directory"))?;
        Ok(Self::new(home.join(".protob")))
    }

    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Directory holding dependency `.proto` files.
    pub fn dependency(&self) -> PathBuf {
        self.home.join("include")
    }

    /// Installed (embedded) compiler executable.
    pub fn compiler(&self) -> PathBuf {
        self.home.join(format!("{COMPILER_NAME}{EXE_SUFFIX}"))
    }

    /// Transient build workspace for plugin sources.
    pub fn temporary(&self) -> PathBuf {
        self.home.join(".temp")
    }

    /// Installed plugin executable.
    pub fn plugin(&self, name: &str) -> PathBuf {
        self.home.join(format!("{name}{EXE_SUFFIX}"))
    }

    pub fn gogo_include(&self) -> PathBuf {
        self.dependency().join(GOGO_NAMESPACE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.home.join("config.toml")
    }
}

/// Replace Windows separators so paths handed to protoc are uniform.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
