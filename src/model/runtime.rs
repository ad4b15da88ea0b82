use std::path::Path;

use super::layout::normalize_path;

/// gogo code generator used for the output flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extension {
    Fast,
    Faster,
    #[default]
    Slick,
}

impl Extension {
    pub fn plugin(&self) -> &'static str {
        match self {
            Extension::Fast => "gogofast",
            Extension::Faster => "gogofaster",
            Extension::Slick => "gogoslick",
        }
    }
}

/// Raw compile options as collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    pub dependencies: Vec<String>,
    pub grpc: bool,
    /// `None` selects the default generator.
    pub extension: Option<Extension>,
    pub source_relative: bool,
    pub arguments: Vec<String>,
    pub output: Option<String>,
    /// Value of `GOPATH`; `<gopath>/src` becomes an extra dependency.
    pub gopath: Option<String>,
}

/// Options for one compile run, fixed once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerRuntime {
    dependencies: Vec<String>,
    grpc: bool,
    extension: Extension,
    source_relative: bool,
    arguments: Vec<String>,
    output: Option<String>,
}

impl CompilerRuntime {
    pub fn new(options: RuntimeOptions) -> Self {
        let mut dependencies: Vec<String> = options
            .dependencies
            .into_iter()
            .filter(|dep| !dep.trim().is_empty())
            .collect();

        if let Some(gopath) = options.gopath.filter(|p| !p.is_empty()) {
            dependencies.push(normalize_path(&Path::new(&gopath).join("src").to_string_lossy()));
        }

        Self {
            dependencies,
            grpc: options.grpc,
            extension: options.extension.unwrap_or_default(),
            source_relative: options.source_relative,
            arguments: options.arguments,
            output: options.output.filter(|o| !o.is_empty()),
        }
    }

    pub fn extension(&self) -> Extension {
        self.extension
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Build the protoc argument list for a single target.
    pub fn build(&self, target: &str) -> Vec<String> {
        let target_dir = parent_dir(target);
        let mut args = Vec::with_capacity(self.dependencies.len() * 2 + self.arguments.len() + 4);

        for dependency in &self.dependencies {
            args.push("-I".to_string());
            args.push(dependency.clone());
        }
        args.push("-I".to_string());
        args.push(target_dir.clone());

        let mut params = Vec::new();
        if self.grpc {
            params.push("plugins=grpc");
        }
        if self.source_relative {
            params.push("paths=source_relative");
        }

        let output_dir = self.output.as_deref().unwrap_or(&target_dir);
        let flag = if params.is_empty() {
            format!("--{}_out={output_dir}", self.extension.plugin())
        } else {
            format!("--{}_out={}:{output_dir}", self.extension.plugin(), params.join(","))
        };
        args.push(flag);

        args.extend(self.arguments.iter().cloned());
        args.push(target.to_string());
        args
    }
}

fn parent_dir(target: &str) -> String {
    match Path::new(target).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => normalize_path(&parent.to_string_lossy()),
        _ => ".".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RuntimeOptions {
        RuntimeOptions::default()
    }

    #[test]
    fn grpc_fast_with_dependency() {
        let runtime = CompilerRuntime::new(RuntimeOptions {
            dependencies: vec!["/a/include".into()],
            grpc: true,
            extension: Some(Extension::Fast),
            ..options()
        });

        assert_eq!(
            runtime.build("/x/y/z.proto"),
            vec![
                "-I",
                "/a/include",
                "-I",
                "/x/y",
                "--gogofast_out=plugins=grpc:/x/y",
                "/x/y/z.proto",
            ]
        );
    }

    #[test]
    fn defaults_to_slick() {
        let runtime = CompilerRuntime::new(options());
        assert_eq!(runtime.extension(), Extension::Slick);
        let args = runtime.build("api/user.proto");
        assert_eq!(args, vec!["-I", "api", "--gogoslick_out=api", "api/user.proto"]);
    }

    #[test]
    fn dependencies_keep_order_and_precede_target_dir() {
        let runtime = CompilerRuntime::new(RuntimeOptions {
            dependencies: vec!["b".into(), "a".into(), "c".into()],
            source_relative: true,
            ..options()
        });
        let args = runtime.build("proto/svc.proto");
        assert_eq!(&args[..8], ["-I", "b", "-I", "a", "-I", "c", "-I", "proto"]);
    }

    #[test]
    fn exactly_one_output_flag() {
        for extension in [Extension::Fast, Extension::Faster, Extension::Slick] {
            let runtime = CompilerRuntime::new(RuntimeOptions {
                extension: Some(extension),
                ..options()
            });
            let outs: Vec<_> = runtime
                .build("a.proto")
                .into_iter()
                .filter(|arg| arg.contains("_out="))
                .collect();
            assert_eq!(outs, vec![format!("--{}_out=.", extension.plugin())]);
        }
    }

    #[test]
    fn params_are_joined() {
        let runtime = CompilerRuntime::new(RuntimeOptions {
            grpc: true,
            source_relative: true,
            extension: Some(Extension::Faster),
            ..options()
        });
        let args = runtime.build("/p/q.proto");
        assert!(args.contains(&"--gogofaster_out=plugins=grpc,paths=source_relative:/p".to_string()));
    }

    #[test]
    fn no_grpc_no_plugins_param() {
        let runtime = CompilerRuntime::new(RuntimeOptions {
            source_relative: true,
            ..options()
        });
        let args = runtime.build("/p/q.proto");
        assert!(args.iter().all(|arg| !arg.contains("plugins=grpc")));
        assert!(args.contains(&"--gogoslick_out=paths=source_relative:/p".to_string()));
    }

    #[test]
    fn explicit_output_used_for_every_target() {
        let runtime = CompilerRuntime::new(RuntimeOptions {
            output: Some("gen".into()),
            ..options()
        });
        assert!(runtime.build("/a/one.proto").contains(&"--gogoslick_out=gen".to_string()));
        assert!(runtime.build("/b/two.proto").contains(&"--gogoslick_out=gen".to_string()));
    }

    #[test]
    fn empty_output_falls_back_to_target_dir() {
        let runtime = CompilerRuntime::new(RuntimeOptions {
            output: Some(String::new()),
            ..options()
        });
        assert!(runtime.build("/a/one.proto").contains(&"--gogoslick_out=/a".to_string()));
    }

    #[test]
    fn passthrough_arguments_precede_target() {
        let runtime = CompilerRuntime::new(RuntimeOptions {
            arguments: vec!["--experimental_allow_proto3_optional".into()],
            ..options()
        });
        let args = runtime.build("/a/one.proto");
        assert_eq!(
            &args[args.len() - 2..],
            ["--experimental_allow_proto3_optional", "/a/one.proto"]
        );
    }

    #[test]
    fn gopath_appends_src_dependency() {
        let runtime = CompilerRuntime::new(RuntimeOptions {
            dependencies: vec!["/usr/include".into()],
            gopath: Some("/home/dev/go".into()),
            ..options()
        });
        assert_eq!(runtime.dependencies(), ["/usr/include", "/home/dev/go/src"]);
        let args = runtime.build("x.proto");
        assert_eq!(&args[..6], ["-I", "/usr/include", "-I", "/home/dev/go/src", "-I", "."]);
    }

    #[test]
    fn bare_file_uses_current_dir() {
        assert_eq!(parent_dir("z.proto"), ".");
        assert_eq!(parent_dir("/z.proto"), "/");
    }
}
