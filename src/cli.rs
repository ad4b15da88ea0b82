use clap::{Args, Parser, Subcommand};

use crate::model::runtime::{Extension, RuntimeOptions};

#[derive(Debug, Parser)]
#[command(name = "protob", version, about = "Install protoc with the gogo plugins and compile .proto files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile Protobuf files
    Compile(CompileArgs),
    /// Install Protobuf compiler and dependencies
    Install(InstallArgs),
    /// Print version info
    Version,
}

#[derive(Debug, Clone, Args)]
pub struct CompileArgs {
    /// using system compiler
    #[arg(long)]
    pub sys: bool,

    /// output directory
    #[arg(short, long)]
    pub output: Option<String>,

    /// enable gogo-fast extension
    #[arg(long, overrides_with_all = ["fast", "faster", "slick"])]
    pub fast: bool,

    /// enable gogo-faster extension
    #[arg(long, overrides_with_all = ["fast", "faster", "slick"])]
    pub faster: bool,

    /// enable gogo-slick extension (default)
    #[arg(long, overrides_with_all = ["fast", "faster", "slick"])]
    pub slick: bool,

    /// whether compile with grpc
    #[arg(long)]
    pub grpc: bool,

    /// transparent argument for protoc set dependencies
    #[arg(short = 'I', long = "proto_path", value_delimiter = ',')]
    pub proto_path: Vec<String>,

    /// transparent argument for protoc set source_relative
    #[arg(long = "source-relative")]
    pub source_relative: bool,

    /// .proto files; arguments after `--` starting with '-' go to protoc as-is
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct InstallArgs {
    /// proxy for http request
    #[arg(long)]
    pub proxy: Option<String>,
}

impl CompileArgs {
    pub fn extension(&self) -> Option<Extension> {
        if self.fast {
            Some(Extension::Fast)
        } else if self.faster {
            Some(Extension::Faster)
        } else if self.slick {
            Some(Extension::Slick)
        } else {
            None
        }
    }

    /// Split positionals into protoc passthrough arguments and targets, and
    /// collect the runtime options.
    pub fn runtime_options(&self, gopath: Option<String>) -> (RuntimeOptions, Vec<String>) {
        let (arguments, targets): (Vec<String>, Vec<String>) = self
            .files
            .iter()
            .filter(|arg| !arg.is_empty())
            .cloned()
            .partition(|arg| arg.starts_with('-'));

        let options = RuntimeOptions {
            dependencies: self.proto_path.clone(),
            grpc: self.grpc,
            extension: self.extension(),
            source_relative: self.source_relative,
            arguments,
            output: self.output.clone(),
            gopath,
        };
        (options, targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::runtime::CompilerRuntime;

    fn compile_args(argv: &[&str]) -> CompileArgs {
        let cli = Cli::try_parse_from(std::iter::once("protob").chain(argv.iter().copied())).unwrap();
        match cli.command {
            Command::Compile(args) => args,
            other => panic!("expected compile, got {other:?}"),
        }
    }

    #[test]
    fn end_to_end_argument_sequence() {
        let args = compile_args(&["compile", "--grpc", "--fast", "-I", "/a/include", "/x/y/z.proto"]);
        let (options, targets) = args.runtime_options(None);
        assert_eq!(targets, vec!["/x/y/z.proto"]);

        let runtime = CompilerRuntime::new(options);
        assert_eq!(
            runtime.build(&targets[0]).join(" "),
            "-I /a/include -I /x/y --gogofast_out=plugins=grpc:/x/y /x/y/z.proto"
        );
    }

    #[test]
    fn last_extension_flag_wins() {
        assert_eq!(compile_args(&["compile", "--fast", "--faster", "a.proto"]).extension(), Some(Extension::Faster));
        assert_eq!(compile_args(&["compile", "--faster", "--fast", "a.proto"]).extension(), Some(Extension::Fast));
        assert_eq!(compile_args(&["compile", "--fast", "--slick", "a.proto"]).extension(), Some(Extension::Slick));
        assert_eq!(compile_args(&["compile", "a.proto"]).extension(), None);
    }

    #[test]
    fn repeated_extension_flag_is_accepted() {
        assert_eq!(compile_args(&["compile", "--fast", "--fast", "a.proto"]).extension(), Some(Extension::Fast));
        assert_eq!(
            compile_args(&["compile", "--slick", "--fast", "--slick", "a.proto"]).extension(),
            Some(Extension::Slick)
        );
    }

    #[test]
    fn proto_path_is_repeatable_and_comma_separated() {
        let args = compile_args(&["compile", "-I", "a,b", "--proto_path", "c", "x.proto"]);
        assert_eq!(args.proto_path, vec!["a", "b", "c"]);
    }

    #[test]
    fn passthrough_after_double_dash() {
        let args = compile_args(&[
            "compile",
            "--source-relative",
            "-o",
            "gen",
            "a.proto",
            "b.proto",
            "--",
            "--experimental_allow_proto3_optional",
        ]);
        let (options, targets) = args.runtime_options(Some("/go".into()));

        assert_eq!(targets, vec!["a.proto", "b.proto"]);
        assert_eq!(options.arguments, vec!["--experimental_allow_proto3_optional"]);
        assert_eq!(options.output.as_deref(), Some("gen"));
        assert!(options.source_relative);
        assert_eq!(options.gopath.as_deref(), Some("/go"));
    }

    #[test]
    fn install_proxy_flag() {
        let cli = Cli::try_parse_from(["protob", "install", "--proxy", "http://127.0.0.1:7890"]).unwrap();
        match cli.command {
            Command::Install(args) => assert_eq!(args.proxy.as_deref(), Some("http://127.0.0.1:7890")),
            other => panic!("expected install, got {other:?}"),
        }
    }

    #[test]
    fn version_subcommand() {
        let cli = Cli::try_parse_from(["protob", "version"]).unwrap();
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
