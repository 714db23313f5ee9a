//! fortune-kiosk CLI
//!
//! Run the fortune-teller kiosk, or check its script and hardware first.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use fortune_kiosk::corpus::Corpus;
use fortune_kiosk::logging::{default_log_path, init_logging};
use fortune_kiosk::peripheral::PhysicalIo;
use fortune_kiosk::platform::{list_serial_candidates, DEV_DIR};
use fortune_kiosk::report::{audit_corpus, format_report};
use fortune_kiosk::tui;
use fortune_kiosk::tui::state::SessionError;
use fortune_kiosk::types::{
    KioskConfig, OutputFormat, Pacing, PrinterConfig, SerialConfig, SerialPortChoice,
};

/// Conventional exit status for a process ended by Ctrl+C.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "fortune-kiosk")]
#[command(about = "Interactive fortune-teller kiosk")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the kiosk until interrupted (Ctrl+C)
    Run(RunArgs),

    /// Check a script file for missing texts and unknown placeholders
    Check {
        /// Tab-separated script file
        #[arg(long, default_value = "Fortune cookie - Script.tsv")]
        corpus: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormatArg,
    },

    /// List serial devices that look like a microcontroller
    Ports {
        /// Device directory to search
        #[arg(long, default_value = DEV_DIR)]
        dev_dir: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Tab-separated script file
    #[arg(long, default_value = "Fortune cookie - Script.tsv")]
    corpus: PathBuf,

    /// Serial device of the microcontroller (default: auto-detect)
    #[arg(long, conflicts_with = "no_serial")]
    serial: Option<PathBuf>,

    /// Run without a microcontroller
    #[arg(long)]
    no_serial: bool,

    /// Serial line speed
    #[arg(long, default_value_t = 9600)]
    baud: u32,

    /// How long to wait for the microcontroller's reply, in milliseconds
    #[arg(long, default_value_t = 1000)]
    ack_timeout_ms: u64,

    /// Delay after opening the serial port, in milliseconds
    #[arg(long, default_value_t = 2000)]
    settle_ms: u64,

    /// Printer character device
    #[arg(long, default_value = "/dev/ttyS0")]
    printer: PathBuf,

    /// Blank lines fed after each fortune
    #[arg(long, default_value_t = 0)]
    feed_lines: usize,

    /// Mandatory pause on the second destiny screen, in milliseconds
    #[arg(long, default_value_t = 3000)]
    destiny_pause_ms: u64,

    /// Hold after printing the fortune, in milliseconds
    #[arg(long, default_value_t = 2000)]
    reveal_hold_ms: u64,

    /// Seed for text selection (reproducible sessions)
    #[arg(long)]
    seed: Option<u64>,

    /// Log file (default: user cache dir)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level or filter directive; RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormatArg {
    Human,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Why a command did not succeed.
enum Failure {
    /// Ctrl+C at the kiosk. Not an error.
    Interrupted,
    Message(String),
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::Message(message)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => cmd_run(args),
        Commands::Check { corpus, format } => cmd_check(&corpus, format.into()),
        Commands::Ports { dev_dir } => cmd_ports(&dev_dir),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure::Interrupted) => ExitCode::from(EXIT_INTERRUPTED),
        Err(Failure::Message(e)) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

impl RunArgs {
    fn to_config(&self) -> KioskConfig {
        let port = match (&self.serial, self.no_serial) {
            (_, true) => SerialPortChoice::Disabled,
            (Some(path), false) => SerialPortChoice::Path(path.clone()),
            (None, false) => SerialPortChoice::Auto,
        };

        KioskConfig {
            corpus_path: self.corpus.clone(),
            serial: SerialConfig {
                port,
                baud: self.baud,
                ack_timeout: Duration::from_millis(self.ack_timeout_ms),
                settle: Duration::from_millis(self.settle_ms),
            },
            printer: PrinterConfig {
                device: self.printer.clone(),
                feed_lines: self.feed_lines,
            },
            pacing: Pacing {
                destiny_pause: Duration::from_millis(self.destiny_pause_ms),
                reveal_hold: Duration::from_millis(self.reveal_hold_ms),
            },
            seed: self.seed,
        }
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn cmd_run(args: RunArgs) -> Result<(), Failure> {
    let log_path = args.log_file.clone().unwrap_or_else(default_log_path);
    if let Err(e) = init_logging(&log_path, &args.log_level) {
        eprintln!("Note: logging disabled ({}: {})", log_path.display(), e);
    }

    let config = args.to_config();
    tracing::info!(?config, "starting kiosk");

    let corpus = Corpus::load(&config.corpus_path).map_err(|e| e.to_string())?;

    // Content defects are fatal before the screen is taken over
    let report = audit_corpus(&corpus);
    if let Err(e) = report.ensure_clean() {
        eprint!("{}", format_report(&report, OutputFormat::Human));
        return Err(Failure::Message(e.to_string()));
    }

    let mut io = PhysicalIo::connect(&config.serial, config.printer.clone());
    if !io.has_serial() {
        tracing::warn!("running without microcontroller");
    }

    match tui::run(&corpus, &config, &mut io) {
        Ok(()) => Ok(()),
        Err(SessionError::Interrupted) => {
            tracing::info!("interrupted at the keyboard");
            Err(Failure::Interrupted)
        }
        Err(e) => {
            tracing::error!(error = %e, "kiosk failed");
            Err(Failure::Message(e.to_string()))
        }
    }
}

fn cmd_check(corpus_path: &Path, format: OutputFormat) -> Result<(), Failure> {
    let corpus = Corpus::load(corpus_path).map_err(|e| e.to_string())?;
    let report = audit_corpus(&corpus);

    print!("{}", format_report(&report, format));

    report.ensure_clean().map_err(|e| e.to_string())?;
    Ok(())
}

fn cmd_ports(dev_dir: &Path) -> Result<(), Failure> {
    let candidates = list_serial_candidates(dev_dir)
        .map_err(|e| format!("cannot list {}: {}", dev_dir.display(), e))?;

    if candidates.is_empty() {
        println!("No serial devices found in {}", dev_dir.display());
        return Ok(());
    }

    for (i, port) in candidates.iter().enumerate() {
        let marker = if i == 0 { "  (auto-detect choice)" } else { "" };
        println!("{}{}", port.display(), marker);
    }

    Ok(())
}
