//! Layout Solver CLI
//!
//! Usage:
//!   layout-solver [--config <FILE>] solve [FILE] [--pretty]
//!   layout-solver [--config <FILE>] batch
//!   layout-solver [--config <FILE>] serve [--host <HOST>] [--port <PORT>] [--origin <ORIGIN>]

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use layout_solver::service::{batch, http, ServiceConfig};
use layout_solver::{solve_json, Error};

#[derive(Parser)]
#[command(name = "layout-solver")]
#[command(about = "Resolve anchor-constrained layouts into pixel geometry")]
struct Cli {
    /// Service configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve one JSON request and print the layout
    Solve {
        /// Input file (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Stream requests line by line from stdin to stdout
    Batch,

    /// Serve the HTTP endpoint
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,

        /// Allowed CORS origin (`*` for any)
        #[arg(long)]
        origin: Option<String>,
    },
}

fn main() -> ExitCode {
    // Logs go to stderr so batch output on stdout stays clean
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match ServiceConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => ServiceConfig::default(),
    };

    match cli.command {
        Command::Solve { input, pretty } => run_solve(input, pretty, &config),
        Command::Batch => run_batch(&config),
        Command::Serve { host, port, origin } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(origin) = origin {
                config.server.origin = origin;
            }
            run_serve(&config)
        }
    }
}

fn run_solve(input: Option<PathBuf>, pretty: bool, config: &ServiceConfig) -> ExitCode {
    let (source, name) = match &input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading from stdin: {}", e);
                return ExitCode::FAILURE;
            }
            (buffer, "<stdin>".to_string())
        }
    };

    match solve_json(&source, &config.layout_config()) {
        Ok(tree) => {
            let rendered = if pretty {
                serde_json::to_string_pretty(&tree)
            } else {
                serde_json::to_string(&tree)
            };
            match rendered {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Err(Error::Parse(e)) => {
            eprint!("{}", e.format(&source, &name));
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e.detailed_message());
            ExitCode::FAILURE
        }
    }
}

fn run_batch(config: &ServiceConfig) -> ExitCode {
    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();

    match batch::run_batch(stdin, &mut stdout, &config.layout_config()) {
        Ok(summary) if summary.has_framing_errors() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "batch stream failed");
            ExitCode::FAILURE
        }
    }
}

fn run_serve(config: &ServiceConfig) -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(http::serve(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}
