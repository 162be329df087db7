//! The per-project build sequence.
//!
//! Each project file is read, optionally compiled, has its references
//! copied, and optionally has its settings printed, before the next one
//! starts. A failure is confined to the project it happened in.

use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::args::{build_args, command_line};
use crate::copy::copy_references;
use crate::descriptor::ProjectDescriptor;
use crate::error::{Error, Result};
use crate::host::Host;
use crate::invoke::{CompileOutput, invoke};

/// What to do with every project file.
#[derive(Debug, Clone)]
pub struct Options {
    /// Build configuration, e.g. `Debug`.
    pub configuration: String,
    /// Copy every reference with a hint path, not only private ones.
    pub copy_all: bool,
    pub nocompile: bool,
    /// Print the resolved settings; implies `nocompile`.
    pub info: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            configuration: "Debug".to_string(),
            copy_all: false,
            nocompile: false,
            info: false,
        }
    }
}

impl Options {
    pub fn compiles(&self) -> bool {
        !(self.nocompile || self.info)
    }
}

/// Result of processing one project file.
#[derive(Debug)]
pub struct ProjectReport {
    pub descriptor: ProjectDescriptor,
    /// `None` when compilation was skipped.
    pub compile: Option<CompileOutput>,
    /// Destinations of the copied reference files.
    pub copied: Vec<PathBuf>,
}

impl ProjectReport {
    /// False only when the compiler ran and exited non-zero.
    pub fn success(&self) -> bool {
        self.compile.as_ref().is_none_or(CompileOutput::success)
    }
}

/// Process one project file, writing the command line, compiler output and
/// `--info` summary to `out`.
pub fn build_project(
    host: &Host,
    options: &Options,
    project: &Path,
    out: &mut impl Write,
) -> Result<ProjectReport> {
    let descriptor = ProjectDescriptor::read(project, &options.configuration, host)?;

    let compile = if options.compiles() {
        let args = build_args(&descriptor);
        writeln!(out, "{}", command_line(host, &args)).map_err(Error::Output)?;
        let output = invoke(host, &descriptor, &args)?;
        write!(out, "{}", output.combined()).map_err(Error::Output)?;
        Some(output)
    } else {
        None
    };

    let copied = copy_references(&descriptor, options.copy_all)?;
    debug!("{}: copied {} file(s)", project.display(), copied.len());

    if options.info {
        let rows = descriptor.summary();
        let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        for (label, value) in rows {
            writeln!(out, "{label:<width$}  {value}").map_err(Error::Output)?;
        }
    }

    Ok(ProjectReport { descriptor, compile, copied })
}

/// Process every project in order. One result per project, in the same
/// order; an error in one project does not stop the rest.
pub fn run(
    host: &Host,
    options: &Options,
    projects: &[PathBuf],
    out: &mut impl Write,
) -> Vec<Result<ProjectReport>> {
    projects
        .iter()
        .map(|project| build_project(host, options, project, out))
        .collect()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorError;
    use crate::host::{HostBuilder, Platform};

    const GOOD: &str = r#"<Project>
  <PropertyGroup><OutputType>Library</OutputType><AssemblyName>Good</AssemblyName></PropertyGroup>
  <PropertyGroup Condition="'$(Configuration)'=='Debug'"><OutputPath>bin\$(Configuration)</OutputPath></PropertyGroup>
  <ItemGroup>
    <Reference Include="Lib"><HintPath>lib\Lib.dll</HintPath><Private>True</Private></Reference>
    <Compile Include="Good.fs" />
  </ItemGroup>
</Project>"#;

    /// A workspace holding `good.fsproj` (with a private reference on
    /// disk), `other.fsproj` (same content) and a malformed `bad.fsproj`.
    fn workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("lib")).unwrap();
        std::fs::write(dir.path().join("lib/Lib.dll"), "lib").unwrap();
        std::fs::write(dir.path().join("good.fsproj"), GOOD).unwrap();
        std::fs::write(dir.path().join("other.fsproj"), GOOD).unwrap();
        std::fs::write(dir.path().join("bad.fsproj"), "<Project><PropertyGroup>").unwrap();
        dir
    }

    fn host(dir: &Path, compiler: &str) -> Host {
        HostBuilder::new()
            .platform(Platform::Linux)
            .working_dir(dir)
            .compiler(compiler)
            .build()
            .unwrap()
    }

    fn projects(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn bad_project_does_not_stop_later_ones() {
        let dir = workspace();
        let mut out = Vec::new();
        let results = run(
            &host(dir.path(), "true"),
            &Options::default(),
            &projects(&["bad.fsproj", "missing.fsproj", "good.fsproj"]),
            &mut out,
        );

        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], Err(Error::Descriptor(DescriptorError::Xml(_)))));
        assert!(matches!(results[1], Err(Error::Descriptor(DescriptorError::Read { .. }))));
        let good = results[2].as_ref().unwrap();
        assert!(good.success());
        assert_eq!(good.descriptor.assembly_name, "Good");
        assert!(String::from_utf8(out).unwrap().starts_with("true --noframework"));
    }

    #[test]
    fn failed_compile_does_not_stop_the_batch() {
        let dir = workspace();
        let mut out = Vec::new();
        let results = run(
            &host(dir.path(), "false"),
            &Options::default(),
            &projects(&["good.fsproj", "other.fsproj"]),
            &mut out,
        );

        assert_eq!(results.len(), 2);
        for result in &results {
            let report = result.as_ref().unwrap();
            assert!(!report.success());
            assert!(report.compile.is_some());
            assert_eq!(report.copied, vec![dir.path().join("bin/Debug/Lib.dll")]);
        }
    }

    #[test]
    fn info_implies_nocompile() {
        let dir = workspace();
        let options = Options { info: true, ..Options::default() };
        let mut out = Vec::new();
        // Compiling would fail to spawn this compiler.
        let report = build_project(
            &host(dir.path(), "fsproj-no-such-compiler"),
            &options,
            Path::new("good.fsproj"),
            &mut out,
        )
        .unwrap();

        assert!(report.compile.is_none());
        assert!(report.success());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("assembly"), "{text}");
        assert!(text.contains(&dir.path().join("bin/Debug/Good.dll").display().to_string()), "{text}");
        assert!(!text.contains("--noframework"), "{text}");
    }

    #[test]
    fn nocompile_still_copies_references() {
        let dir = workspace();
        let options = Options { nocompile: true, ..Options::default() };
        let mut out = Vec::new();
        let report = build_project(
            &host(dir.path(), "fsproj-no-such-compiler"),
            &options,
            Path::new("good.fsproj"),
            &mut out,
        )
        .unwrap();

        assert!(report.compile.is_none());
        assert_eq!(report.copied, vec![dir.path().join("bin/Debug/Lib.dll")]);
        assert!(out.is_empty());
    }

    #[test]
    fn configuration_is_forwarded() {
        let dir = workspace();
        let options = Options { configuration: "Release".to_string(), nocompile: true, ..Options::default() };
        let mut out = Vec::new();
        let err = build_project(&host(dir.path(), "true"), &options, Path::new("good.fsproj"), &mut out)
            .unwrap_err();
        assert!(matches!(err, Error::Descriptor(DescriptorError::NoMatchingGroup(ref c)) if c == "Release"));
    }
}
