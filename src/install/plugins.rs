use std::path::{Path, PathBuf};
use std::process::Command;

use super::InstallError;
use crate::compiler::find_executable;
use crate::model::layout::Layout;

/// gogo generators built from the plugin sources, in build order.
pub const PLUGINS: [&str; 3] = [
    "protoc-gen-gogofast",
    "protoc-gen-gogofaster",
    "protoc-gen-gogoslick",
];

/// Locate the Go toolchain named `go` (a bare name is searched on `PATH`).
pub fn find_toolchain(go: &str) -> Result<PathBuf, InstallError> {
    let candidate = Path::new(go);
    if candidate.components().count() > 1 {
        return if candidate.is_file() {
            Ok(candidate.to_path_buf())
        } else {
            Err(InstallError::ToolchainNotFound(go.to_string()))
        };
    }
    find_executable(go).ok_or_else(|| InstallError::ToolchainNotFound(go.to_string()))
}

/// Build every plugin from `source` into the layout's home. Stops at the first
/// failure; plugins built before it stay installed.
pub fn build_plugins(
    toolchain: &Path,
    source: &Path,
    layout: &Layout,
) -> Result<Vec<PathBuf>, InstallError> {
    let mut built = Vec::with_capacity(PLUGINS.len());

    for plugin in PLUGINS {
        let binary = layout.plugin(plugin);
        let input = source.join(plugin).join("main.go");
        tracing::info!(plugin, binary = %binary.display(), "building plugin");

        let output = Command::new(toolchain)
            .arg("build")
            .arg("-o")
            .arg(&binary)
            .arg(&input)
            .current_dir(source)
            .output()?;

        if !output.status.success() {
            let mut detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if detail.is_empty() {
                detail = format!("exited with {}", output.status);
            }
            tracing::warn!(plugin, built = built.len(), "plugin build failed");
            return Err(InstallError::PluginBuild {
                plugin: plugin.to_string(),
                output: detail,
            });
        }
        built.push(binary);
    }

    Ok(built)
}

/// Plugins currently present in the layout.
pub fn installed_plugins(layout: &Layout) -> Vec<&'static str> {
    PLUGINS
        .into_iter()
        .filter(|plugin| layout.plugin(plugin).is_file())
        .collect()
}
