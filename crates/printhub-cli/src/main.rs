// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PrintHub: LAN printer bridge, command-line front end.
//
// Entry point. Loads configuration, initialises logging, and runs one
// connector operation. Results go to stdout as pretty JSON; failures print
// the humanized message and exit non-zero.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use printhub_core::config::ConnectorConfig;
use printhub_core::error::Result;
use printhub_core::human_errors::humanize_error;
use printhub_core::types::{MAX_TRAILING_NEWLINES, PrintIntent, PrinterTarget, ReceiptJob, TextJob};
use printhub_print::Connector;

#[derive(Parser)]
#[command(name = "printhub")]
#[command(about = "PrintHub - discover and print to raw TCP receipt printers", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show hostname, local IP and the suggested scan range
    Info,

    /// Scan a /24 for open printer ports
    Scan {
        /// Network base such as 192.168.1 (defaults to the local network)
        #[arg(long)]
        base: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        /// Per-host timeout
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Check whether one printer is reachable
    Ping {
        host: String,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Skip the status query after connecting
        #[arg(long)]
        no_status_query: bool,
    },

    /// Print plain text
    PrintText {
        host: String,

        #[arg(long)]
        text: String,

        /// Character encoding label (utf-8, cp437, gbk, ...)
        #[arg(long, default_value = "utf-8")]
        encoding: String,

        /// Line feeds after the text
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=MAX_TRAILING_NEWLINES as i64))]
        newlines: u8,

        /// Do not cut the paper afterwards
        #[arg(long)]
        no_cut: bool,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Print an itemised receipt described by a JSON file
    PrintReceipt {
        host: String,

        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Send device-ready bytes verbatim
    PrintRaw {
        host: String,

        /// Payload as standard base64
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        base64: Option<String>,

        /// Payload file
        #[arg(long)]
        file: Option<PathBuf>,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match ConnectorConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}", humanize_error(&e).message);
                return ExitCode::FAILURE;
            }
        },
        None => ConnectorConfig::default(),
    };

    let fallback = if cli.verbose { "debug" } else { config.log_filter.as_str() };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();

    tracing::debug!(?config, "printhub starting");

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let human = humanize_error(&e);
            tracing::debug!(error = %e, status = human.status_code, "command failed");
            eprintln!("error: {}", human.message);
            eprintln!("hint:  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, mut config: ConnectorConfig) -> Result<()> {
    match command {
        Commands::Info => {
            let connector = Connector::new(config);
            print_json(&connector.network_info())
        }

        Commands::Scan {
            base,
            port,
            timeout_ms,
        } => {
            let connector = Connector::new(config);
            let base = match base {
                Some(base) => base,
                None => connector.network_info().network_base,
            };
            let report = connector.discover(&base, port, timeout_ms).await?;
            print_json(&report)
        }

        Commands::Ping {
            host,
            port,
            timeout_ms,
            no_status_query,
        } => {
            if no_status_query {
                config.status_query = false;
            }
            let connector = Connector::new(config);
            let target = connector.ip_target(&host, port, timeout_ms)?;
            print_json(&connector.probe(&target).await)
        }

        Commands::PrintText {
            host,
            text,
            encoding,
            newlines,
            no_cut,
            port,
            timeout_ms,
        } => {
            let job = TextJob {
                content: text,
                encoding,
                trailing_newlines: newlines,
                cut_after: !no_cut,
            };
            let intent = PrintIntent::text(job)?;
            let connector = Connector::new(config);
            let target = connector.target(&host, port, timeout_ms)?;
            deliver(&connector, &target, &intent).await
        }

        Commands::PrintReceipt {
            host,
            file,
            port,
            timeout_ms,
        } => {
            let connector = Connector::new(config);
            let target = connector.ip_target(&host, port, timeout_ms)?;
            let raw = std::fs::read_to_string(&file)?;
            let job: ReceiptJob = serde_json::from_str(&raw)?;
            deliver(&connector, &target, &PrintIntent::receipt(job)?).await
        }

        Commands::PrintRaw {
            host,
            base64,
            file,
            port,
            timeout_ms,
        } => {
            let intent = match (base64, file) {
                (Some(encoded), _) => PrintIntent::raw_base64(&encoded)?,
                (None, Some(path)) => PrintIntent::raw(std::fs::read(&path)?)?,
                (None, None) => {
                    return Err(printhub_core::PrinthubError::Validation(
                        "raw payload requires --base64 or --file".into(),
                    ));
                }
            };
            let connector = Connector::new(config);
            let target = connector.target(&host, port, timeout_ms)?;
            deliver(&connector, &target, &intent).await
        }
    }
}

async fn deliver(connector: &Connector, target: &PrinterTarget, intent: &PrintIntent) -> Result<()> {
    let receipt = connector.deliver(target, intent).await?;
    print_json(&receipt)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
