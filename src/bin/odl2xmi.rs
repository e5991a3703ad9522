//! `odl2xmi`: list the packages of an ODL export or convert it to XMI.
//!
//! ```text
//! odl2xmi list <input>
//! odl2xmi generate <input> [package-path]
//! ```
//!
//! `<input>` is an export directory or a ZIP archive. Logging goes to
//! stderr and is filtered with `RUST_LOG` (default `warn`).

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use odl::hir::ExtractOptions;
use odl::interchange::{Corpus, InterchangeError, XmiWriter};

const USAGE: &str = "Usage: odl2xmi <generate|list> <input> [package path]";

enum Command<'a> {
    List { input: &'a Path },
    Generate { input: &'a Path, package: Option<&'a str> },
}

fn parse_args(args: &[String]) -> Option<Command<'_>> {
    match args {
        [verb, input] if verb == "list" => Some(Command::List {
            input: Path::new(input),
        }),
        [verb, input, rest @ ..] if verb == "generate" && rest.len() <= 1 => Some(Command::Generate {
            input: Path::new(input),
            package: rest.first().map(String::as_str),
        }),
        _ => None,
    }
}

fn list(input: &Path) -> Result<(), InterchangeError> {
    let corpus = Corpus::open(input)?;
    let mut stdout = std::io::stdout().lock();
    for package in corpus.packages()? {
        for path in package.paths() {
            writeln!(stdout, "{path}")?;
        }
    }
    Ok(())
}

fn generate(input: &Path, package: Option<&str>) -> Result<(), InterchangeError> {
    let mut options = ExtractOptions::new().with_parallel(true);
    if let Some(package) = package {
        tracing::info!(package, "restricting to package");
        options = options.with_package(package);
    }

    let corpus = Corpus::open(input)?;
    let model = corpus.reconstruct(&options)?;
    let warnings = model.diagnostics.warning_count();
    if warnings > 0 {
        tracing::warn!(warnings, "model reconstructed with warnings");
    }

    let xmi = XmiWriter::new().write(&model)?;
    std::io::stdout().lock().write_all(&xmi)?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = parse_args(&args) else {
        eprintln!("{USAGE}");
        return ExitCode::from(1);
    };

    let result = match command {
        Command::List { input } => list(input),
        Command::Generate { input, package } => generate(input, package),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("odl2xmi: {e}");
            ExitCode::from(2)
        }
    }
}
