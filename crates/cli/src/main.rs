mod commands;
mod serve;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::commands::states::cmd_states;
use crate::commands::transition::{cmd_transition, TransitionArgs};
use crate::serve::config::ServeConfig;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Problem record state transitions.
#[derive(Parser)]
#[command(
    name = "problemflow",
    version,
    about = "Guarded state transitions for problem records"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server over a seed file
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
        /// Base URL for reference links (default: PROBLEMFLOW_INSTANCE_URL or http://localhost:<port>/)
        #[arg(long)]
        instance_url: Option<String>,
        /// Path to TLS certificate PEM file (requires --tls-key)
        #[arg(long)]
        tls_cert: Option<PathBuf>,
        /// Path to TLS private key PEM file (requires --tls-cert)
        #[arg(long)]
        tls_key: Option<PathBuf>,
        /// JSON seed file with problems and reference labels
        seed: PathBuf,
    },

    /// Run a single transition against a seed file and print the result
    Transition {
        /// JSON seed file with problems and reference labels
        seed: PathBuf,
        /// Problem number, e.g. PRB0040001
        number: String,
        /// Target state code, e.g. 103
        new_state: String,
        /// Submitted fields as a JSON object
        #[arg(long)]
        data: Option<String>,
        /// Display value mode: false, true or all
        #[arg(long)]
        display_value: Option<String>,
        /// Omit reference links from the result
        #[arg(long)]
        exclude_reference_link: bool,
        /// Comma separated fields to return
        #[arg(long)]
        fields: Option<String>,
        /// Base URL for reference links
        #[arg(long)]
        instance_url: Option<String>,
    },

    /// Print the state transition table
    States,
}

/// Install the global tracing subscriber. Logs go to stderr so stdout stays
/// machine readable.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            instance_url,
            tls_cert,
            tls_key,
            seed,
        } => {
            init_tracing("info");
            // Validate TLS flags: both must be provided or neither
            if tls_cert.is_some() != tls_key.is_some() {
                report_error(
                    "--tls-cert and --tls-key must both be provided",
                    cli.output,
                    cli.quiet,
                );
                process::exit(1);
            }
            let config = ServeConfig::from_env(port, seed, instance_url).with_tls(tls_cert, tls_key);
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    report_error(
                        &format!("failed to create tokio runtime: {}", e),
                        cli.output,
                        cli.quiet,
                    );
                    process::exit(1);
                }
            };
            if let Err(e) = rt.block_on(serve::start_server(config)) {
                report_error(&format!("server error: {}", e), cli.output, cli.quiet);
                process::exit(1);
            }
        }
        Commands::Transition {
            seed,
            number,
            new_state,
            data,
            display_value,
            exclude_reference_link,
            fields,
            instance_url,
        } => {
            init_tracing(if cli.quiet || cli.output == OutputFormat::Json {
                "off"
            } else {
                "warn"
            });
            cmd_transition(
                TransitionArgs {
                    seed: &seed,
                    number,
                    new_state,
                    data: data.as_deref(),
                    display_value: display_value.as_deref(),
                    exclude_reference_link,
                    fields: fields.as_deref(),
                    instance_url,
                },
                cli.output,
                cli.quiet,
            );
        }
        Commands::States => {
            cmd_states(cli.output);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
