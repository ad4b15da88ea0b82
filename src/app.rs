use std::path::PathBuf;

use anyhow::{Result, anyhow};

use crate::cli::{Command, CompileArgs, InstallArgs};
use crate::compiler::{Compiler, CompilerError, search_path};
use crate::install::plugins::installed_plugins;
use crate::install::{InstallSettings, Installer};
use crate::model::config::AppConfig;
use crate::model::layout::{Layout, normalize_path};
use crate::model::runtime::CompilerRuntime;
use crate::ui::{Logger, Spinner};
use crate::version::VersionReport;

pub struct App {
    config: AppConfig,
    layout: Layout,
    search_path: Vec<PathBuf>,
}

impl App {
    pub fn new(config: AppConfig, layout: Layout) -> Self {
        Self {
            config,
            layout,
            search_path: search_path(),
        }
    }

    #[cfg(test)]
    fn with_search_path(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_path = dirs;
        self
    }

    pub fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Compile(args) => self.compile(&args),
            Command::Install(args) => self.install(args),
            Command::Version => {
                print!("{}", self.version_report().render());
                Ok(())
            }
        }
    }

    fn compile(&self, args: &CompileArgs) -> Result<()> {
        let use_system = args.sys || self.config.compile.use_system;
        let compiler =
            Compiler::resolve_in(&self.layout.compiler(), use_system, self.search_path.clone())
                .map_err(|err| anyhow!("compile: compiler not found or invalid ({err})"))?;
        tracing::info!(
            compiler = %compiler.path().display(),
            version = %compiler.version,
            "resolved compiler"
        );

        let (options, targets) = args.runtime_options(std::env::var("GOPATH").ok());
        if targets.is_empty() {
            return Err(anyhow!("compile: no .proto files given"));
        }

        let runtime = CompilerRuntime::new(options);
        tracing::debug!(
            extension = runtime.extension().plugin(),
            dependencies = ?runtime.dependencies(),
            targets = targets.len(),
            "compile runtime"
        );
        for target in &targets {
            compiler.compile(target, &runtime).map_err(|err| match err {
                CompilerError::Failed { target, output } => {
                    anyhow!("compile: build '{target}' error: {output}")
                }
                other => anyhow!("compile: build '{target}' error: {other}"),
            })?;
            tracing::info!(%target, "compiled");
        }

        Logger::stdout().success("build completed");
        Ok(())
    }

    fn install(&self, args: InstallArgs) -> Result<()> {
        let settings = InstallSettings::from_config(&self.config, args.proxy);
        let installer = Installer::new(settings, self.layout.clone())
            .map_err(|err| anyhow!("install: preparing http client: {err}"))?;

        let spinner = Spinner::start("fetch protobuf latest release");
        match installer.install_compiler(&spinner) {
            Ok(tag) => spinner.success(&format!("protobuf {tag} installed")),
            Err(err) => {
                spinner.fail(&err.to_string());
                return Err(err.into());
            }
        }

        let spinner = Spinner::start("fetch gogo latest release");
        match installer.install_plugins(&spinner) {
            Ok(tag) => spinner.success(&format!("gogo {tag} installed")),
            Err(err) => {
                spinner.fail(&err.to_string());
                return Err(err.into());
            }
        }
        Ok(())
    }

    fn version_report(&self) -> VersionReport {
        let mut report = VersionReport::from_build();
        report.base_dir = normalize_path(&self.layout.home().to_string_lossy());
        report.include_path = normalize_path(&self.layout.dependency().to_string_lossy());
        report.system_compiler = Compiler::system().ok().map(|c| c.version);
        report.embedded_compiler = Compiler::new(self.layout.compiler()).ok().map(|c| c.version);
        report.plugins = installed_plugins(&self.layout)
            .into_iter()
            .map(str::to_string)
            .collect();
        report
    }
}

/// Errors already shown by a spinner are not printed twice.
pub fn already_reported(err: &anyhow::Error) -> bool {
    err.downcast_ref::<crate::install::InstallError>().is_some()
}
