use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub install: InstallConfig,
    pub compile: CompileConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallConfig {
    pub proxy: String,
    pub api_url: String,
    pub user_agent: String,
    pub compiler_repo: String,
    pub plugin_repo: String,
    pub go: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompileConfig {
    pub use_system: bool,
}

const DEFAULTS: &str = include_str!("../../config/default.toml");

impl AppConfig {
    /// Load configuration with layering: defaults → user config at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let mut merged: toml::Table = toml::from_str(DEFAULTS)?;

        if path.exists() {
            let user_str = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let user: toml::Table = toml::from_str(&user_str)
                .with_context(|| format!("parsing {}", path.display()))?;
            merge_tables(&mut merged, user);
        }

        let config: AppConfig = toml::Value::Table(merged).try_into()?;
        config.validate()?;
        Ok(config)
    }

    pub fn defaults() -> Result<Self> {
        Ok(toml::from_str(DEFAULTS)?)
    }

    /// The configured proxy, if any. Empty means direct connections.
    pub fn proxy(&self) -> Option<&str> {
        let proxy = self.install.proxy.trim();
        (!proxy.is_empty()).then_some(proxy)
    }

    fn validate(&self) -> Result<()> {
        for repo in [&self.install.compiler_repo, &self.install.plugin_repo] {
            split_repo(repo)?;
        }
        Ok(())
    }
}

/// Split an `owner/repo` slug.
pub fn split_repo(slug: &str) -> Result<(&str, &str)> {
    match slug.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => Err(anyhow!("invalid repository '{slug}', expected owner/repo")),
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                merge_tables(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
