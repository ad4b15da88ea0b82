use std::fmt::Write;

/// Everything `protob version` prints.
#[derive(Debug, Clone, Default)]
pub struct VersionReport {
    pub version: String,
    pub rustc_version: String,
    pub build_time: String,
    pub git_revision: String,
    pub base_dir: String,
    pub include_path: String,
    pub system_compiler: Option<String>,
    pub embedded_compiler: Option<String>,
    pub plugins: Vec<String>,
}

impl VersionReport {
    /// Build information baked in at compile time.
    pub fn from_build() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            rustc_version: env!("PROTOB_RUSTC_VERSION").to_string(),
            build_time: env!("PROTOB_BUILD_TIME").to_string(),
            git_revision: env!("PROTOB_GIT_REVISION").to_string(),
            ..Self::default()
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "CommandLine: protob");
        let _ = writeln!(out, " Version: {}", self.version);
        let _ = writeln!(out, " Rust Version: {}", self.rustc_version);
        let _ = writeln!(out, " Built: {}(Rev: {})", self.build_time, self.git_revision);
        let _ = writeln!(out, " Base Dir: {}", self.base_dir);
        let _ = writeln!(out);
        let _ = writeln!(out, "Protobuf: protoc");
        if let Some(version) = &self.system_compiler {
            let _ = writeln!(out, " System Compiler: {version}(system)");
        }
        if let Some(version) = &self.embedded_compiler {
            let _ = writeln!(out, " Embedded Compiler: {version}(embedded)");
        }
        let _ = writeln!(out, " Include Path: {}", self.include_path);
        if !self.plugins.is_empty() {
            let _ = writeln!(out, " Plugins: {}", self.plugins.join(", "));
        }

        if self.system_compiler.is_none() && self.embedded_compiler.is_none() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Please run 'protob install' to install protobuf compiler");
        }
        out
    }
}
