use anyhow::Result;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use traceadjust::{
    adjuster::{self, RunSummary},
    cli::Cli,
    config::AdjustConfig,
    error::exit_code,
};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Settings file (if any) with command-line overrides applied
fn load_config(args: &Cli) -> Result<AdjustConfig> {
    let config = match &args.config {
        Some(path) => AdjustConfig::from_toml(path)?,
        None => AdjustConfig::default(),
    };
    Ok(args.apply_overrides(config))
}

/// Output file that is only created (and truncated) on the first write
///
/// A trace rejected at the header check leaves an existing file untouched.
struct DeferredFile {
    path: PathBuf,
    file: Option<BufWriter<File>>,
}

impl DeferredFile {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            file: None,
        }
    }

    fn file(&mut self) -> io::Result<&mut BufWriter<File>> {
        match &mut self.file {
            Some(file) => Ok(file),
            slot => {
                let file = File::create(&self.path).map_err(|e| {
                    io::Error::new(
                        e.kind(),
                        format!("cannot create output file '{}': {}", self.path.display(), e),
                    )
                })?;
                Ok(slot.insert(BufWriter::new(file)))
            }
        }
    }
}

impl Write for DeferredFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.file {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Output sink: the named file, or stdout
fn open_output(path: Option<&Path>) -> Box<dyn Write> {
    match path {
        Some(path) => Box::new(DeferredFile::new(path)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    }
}

fn print_summary(summary: &RunSummary) {
    match serde_json::to_string_pretty(summary) {
        Ok(json) => eprintln!("{}", json),
        Err(e) => tracing::warn!("Failed to serialize run summary: {}", e),
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    // Sign on
    eprintln!("traceadjust v{}", env!("CARGO_PKG_VERSION"));
    eprintln!();

    let Some(trace_path) = args.trace_file.as_deref() else {
        eprintln!("traceadjust: No arguments supplied. Cannot continue.");
        return ExitCode::from(exit_code::NO_ARGS);
    };

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("traceadjust: {:#}", e);
            return ExitCode::from(exit_code::CONFIG);
        }
    };
    tracing::debug!(?config, "effective settings");

    let input = match File::open(trace_path) {
        Ok(file) => BufReader::new(file),
        Err(e) => {
            tracing::debug!("open {} failed: {}", trace_path.display(), e);
            eprintln!(
                "traceadjust: Cannot open trace file '{}'.",
                trace_path.display()
            );
            return ExitCode::from(exit_code::NO_FILE);
        }
    };

    let output = open_output(args.output.as_deref());

    match adjuster::adjust_stream(input, output, &config) {
        Ok(summary) => {
            if args.summary {
                print_summary(&summary);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("traceadjust: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
