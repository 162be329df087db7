//! Host configuration: the platform-dependent facts the build needs.
//!
//! A [`Host`] is built once at startup and passed by reference to every
//! component that depends on the platform or on the launch directory, so
//! nothing reads or mutates process-global state while a project is being
//! processed.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable that overrides the compiler executable.
pub const COMPILER_ENV: &str = "FSPROJ_COMPILER";

/// Operating system family the build runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) { Self::Windows } else { Self::Linux }
    }

    /// Name of the F# compiler executable shipped on this platform.
    pub fn default_compiler(self) -> &'static str {
        match self {
            Self::Linux => "fsharpc",
            Self::Windows => "fsc.exe",
        }
    }
}

/// Immutable host configuration.
#[derive(Debug, Clone)]
pub struct Host {
    platform: Platform,
    working_dir: PathBuf,
    compiler: String,
}

impl Host {
    /// Build a host from the running process: current platform, current
    /// directory, and the `FSPROJ_COMPILER` override if set.
    pub fn from_env() -> Result<Self> {
        HostBuilder::new().system_env().build()
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Directory that relative project-file arguments resolve against.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Compiler executable invoked for every project.
    pub fn compiler(&self) -> &str {
        &self.compiler
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  HostBuilder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for [`Host`].
///
/// # Example
/// ```
/// use fsproj_rs::host::{HostBuilder, Platform};
///
/// let host = HostBuilder::new()
///     .platform(Platform::Windows)
///     .working_dir("/projects")
///     .build()
///     .unwrap();
/// assert_eq!(host.compiler(), "fsc.exe");
/// ```
#[derive(Debug, Clone, Default)]
pub struct HostBuilder {
    platform: Option<Platform>,
    working_dir: Option<PathBuf>,
    compiler: Option<String>,
}

impl HostBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the detected platform.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Use an explicit working directory instead of the process one.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Use an explicit compiler executable instead of the platform default.
    pub fn compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = Some(compiler.into());
        self
    }

    /// Pick up `FSPROJ_COMPILER` from the process environment.
    ///
    /// An explicit [`compiler`](Self::compiler) call made *after* this one
    /// takes precedence; empty values are ignored.
    pub fn system_env(mut self) -> Self {
        if let Ok(compiler) = std::env::var(COMPILER_ENV) {
            if !compiler.trim().is_empty() {
                self.compiler = Some(compiler);
            }
        }
        self
    }

    pub fn build(self) -> Result<Host> {
        let platform = self.platform.unwrap_or_else(Platform::current);
        let working_dir = match self.working_dir {
            Some(dir) => dir,
            None => std::env::current_dir().map_err(Error::WorkingDir)?,
        };
        let compiler = self
            .compiler
            .unwrap_or_else(|| platform.default_compiler().to_string());
        Ok(Host { platform, working_dir, compiler })
    }
}
