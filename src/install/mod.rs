pub mod archive;
pub mod extract;
pub mod plugins;
pub mod release;

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use zip::result::ZipError;

use crate::model::config::{AppConfig, split_repo};
use crate::model::layout::Layout;
use crate::ui::Progress;
use archive::Archive;
use release::{HttpConfig, Platform, ReleaseClient};

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("download: release not found")]
    ReleaseNotFound,
    #[error("install: unable to match asset for this platform")]
    AssetNotMatched,
    #[error("install: compiler archive has no bin/ executable")]
    MissingExecutable,
    #[error("install: release {0} has no source zipball")]
    MissingZipball(String),
    #[error("install: go compiler '{0}' not found")]
    ToolchainNotFound(String),
    #[error("install: build {plugin} failed: {output}")]
    PluginBuild { plugin: String, output: String },
    #[error("install: archive entry '{0}' escapes the destination")]
    UnsafeEntry(String),
    #[error("install: {0}")]
    Config(String),
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("archive: {0}")]
    Archive(#[from] ZipError),
    #[error("io: {0}")]
    Io(#[from] io::Error),
}

/// Repositories and tools one install run works with.
#[derive(Debug, Clone)]
pub struct InstallSettings {
    pub http: HttpConfig,
    pub compiler_repo: String,
    pub plugin_repo: String,
    pub go: String,
    pub platform: Platform,
}

impl InstallSettings {
    /// Settings from config; `proxy` (from the command line) wins over the configured one.
    pub fn from_config(config: &AppConfig, proxy: Option<String>) -> Self {
        let proxy = proxy
            .filter(|p| !p.trim().is_empty())
            .or_else(|| config.proxy().map(str::to_string));

        Self {
            http: HttpConfig {
                api_url: config.install.api_url.clone(),
                user_agent: config.install.user_agent.clone(),
                proxy,
                token: std::env::var("GITHUB_TOKEN").ok(),
            },
            compiler_repo: config.install.compiler_repo.clone(),
            plugin_repo: config.install.plugin_repo.clone(),
            go: config.install.go.clone(),
            platform: Platform::current(),
        }
    }
}

pub struct Installer {
    client: ReleaseClient,
    settings: InstallSettings,
    layout: Layout,
}

impl Installer {
    pub fn new(settings: InstallSettings, layout: Layout) -> Result<Self, InstallError> {
        let client = ReleaseClient::new(&settings.http)?;
        Ok(Self {
            client,
            settings,
            layout,
        })
    }

    /// Install protoc and the google include protos. Returns the release tag.
    pub fn install_compiler(&self, progress: &dyn Progress) -> Result<String, InstallError> {
        let (owner, repo) = repo_parts(&self.settings.compiler_repo)?;
        let release = self.client.latest_release(owner, repo)?;

        progress.step(&format!("downloading protobuf version {}", release.tag_name));
        let content = self.client.download_asset(&release, self.settings.platform)?;

        progress.step(&format!("extracting resources into {}", self.layout.home().display()));
        install_compiler_archive(content, &self.layout)?;
        Ok(release.tag_name)
    }

    /// Build the gogo plugins from the latest source release. Returns the release tag.
    pub fn install_plugins(&self, progress: &dyn Progress) -> Result<String, InstallError> {
        let toolchain = plugins::find_toolchain(&self.settings.go)?;
        let (owner, repo) = repo_parts(&self.settings.plugin_repo)?;
        let release = self.client.latest_release(owner, repo)?;

        progress.step(&format!("downloading gogo version {}", release.tag_name));
        let content = self.client.download_zipball(&release)?;

        install_plugin_archive(content, &toolchain, &self.layout, progress)?;
        Ok(release.tag_name)
    }
}

pub fn install_compiler_archive(content: Vec<u8>, layout: &Layout) -> Result<(), InstallError> {
    let mut archive = Archive::from_bytes(content)?;
    tracing::debug!(entries = archive.len(), "opened compiler archive");
    extract::extract_compiler(&mut archive, layout)?;
    Ok(())
}

/// Extract plugin sources into the temp dir, build them, and remove the temp
/// dir whether or not the build succeeded.
pub fn install_plugin_archive(
    content: Vec<u8>,
    toolchain: &Path,
    layout: &Layout,
    progress: &dyn Progress,
) -> Result<(), InstallError> {
    let temp = layout.temporary();
    let mut archive = Archive::from_bytes(content)?;

    progress.step(&format!("extracting resources into {}", temp.display()));
    let result = extract::extract_plugin_sources(&mut archive, &temp, layout).and_then(|_| {
        progress.step("compiling gogo plugins");
        plugins::build_plugins(toolchain, &temp, layout)
    });

    progress.step("cleaning temporary directory");
    let cleanup = match fs::remove_dir_all(&temp) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    };

    result?;
    cleanup?;
    Ok(())
}

fn repo_parts(slug: &str) -> Result<(&str, &str), InstallError> {
    split_repo(slug).map_err(|err| InstallError::Config(err.to_string()))
}
