//! Running the compiler for one project.

use std::process::{Command, ExitStatus};

use log::{debug, warn};

use crate::args::{command_line, exec_args};
use crate::descriptor::ProjectDescriptor;
use crate::error::{Error, Result};
use crate::host::Host;

/// What the compiler left behind.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CompileOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Standard output followed by standard error.
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }
}

/// Compile `d` with the already-synthesized `args`.
///
/// The output directory is created first. The compiler is spawned directly
/// (no shell) with the display quotes removed from path arguments, and runs
/// with `project_dir` as its working directory. A non-zero exit status is
/// returned as data; only failing to create the directory or to start the
/// compiler is an error.
pub fn invoke(host: &Host, d: &ProjectDescriptor, args: &[String]) -> Result<CompileOutput> {
    std::fs::create_dir_all(&d.output_dir)
        .map_err(|e| Error::io("cannot create output directory", &d.output_dir, e))?;

    debug!("running in {}: {}", d.project_dir.display(), command_line(host, args));

    let output = Command::new(host.compiler())
        .args(exec_args(args))
        .current_dir(&d.project_dir)
        .output()
        .map_err(|e| Error::io("cannot run compiler in", &d.project_dir, e))?;

    let result = CompileOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    if !result.success() {
        warn!("{}: compiler exited with {}", d.project_file_path.display(), result.status);
    }
    Ok(result)
}
