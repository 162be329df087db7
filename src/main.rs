use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use fsproj_rs::Host;
use fsproj_rs::build::{self, Options};

#[derive(Parser)]
#[command(name = "fsproj")]
#[command(version, about = "Build F# project files with the F# compiler")]
struct Cli {
    /// Use the specific configuration
    #[arg(short, long, value_name = "CONFIG", default_value = "Debug")]
    config: String,

    /// Copy every reference with a hint path, not only private ones
    #[arg(short, long)]
    references: bool,

    /// Skip compilation
    #[arg(short, long)]
    nocompile: bool,

    /// Print the resolved project settings (implies --nocompile)
    #[arg(short, long)]
    info: bool,

    /// Project files to build
    #[arg(required = true, value_name = "PROJECT")]
    projects: Vec<PathBuf>,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            configuration: self.config.clone(),
            copy_all: self.references,
            nocompile: self.nocompile,
            info: self.info,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let host = match Host::from_env() {
        Ok(host) => host,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let results = build::run(&host, &cli.options(), &cli.projects, &mut std::io::stdout().lock());

    let mut failed = false;
    for (project, result) in cli.projects.iter().zip(results) {
        match result {
            Ok(report) => failed |= !report.success(),
            Err(e) => {
                eprintln!("error: {}: {e}", project.display());
                failed = true;
            }
        }
    }

    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
