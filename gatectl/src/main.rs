//! gatectl: evaluate flavor/version test gates from the shell.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gatectl")]
#[command(about = "gatectl - decide whether a flavor/version gated test should run")]
#[command(version)]
struct Cli {
    /// Config file (default: $GATE_CONFIG, then the platform config dir)
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an expression and print it in normalized form
    Parse {
        /// Version expression (e.g. "only >= 21.1", "skip < 22")
        expr: String,

        /// Print the predicate as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Decide whether a test marked with EXPR runs against a server
    Check {
        /// Version expression (default: "only")
        expr: Option<String>,

        /// The server is the named flavor (default: reference server)
        #[arg(short = 'f', long = "flavor")]
        flavor: bool,

        /// Version reported by the server (e.g. "v22.1.3")
        #[arg(short = 's', long = "server-version", conflicts_with = "server_version_num")]
        server_version: Option<String>,

        /// Numeric server version (e.g. 220103 for 22.1.3)
        #[arg(short = 'n', long = "server-version-num")]
        server_version_num: Option<u32>,

        /// Reason keyword or text appended to the skip message
        #[arg(short = 'r', long = "reason")]
        reason: Option<String>,

        /// Print the decision as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Show a reason with its issue link
    Reason {
        /// Reason keyword (e.g. "encoding")
        keyword: String,
    },

    /// List known reason keywords
    Reasons {
        /// Print as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Print the marker registration line
    Marker,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("GATE_LOG", default_level))
        .format_timestamp(None)
        .init();
}

fn run(command: Commands, config: &gate::Config) -> gate::Result<()> {
    match command {
        Commands::Parse { expr, json } => commands::parse(&expr, json),
        Commands::Check {
            expr,
            flavor,
            server_version,
            server_version_num,
            reason,
            json,
        } => {
            let server =
                commands::server_info(flavor, server_version.as_deref(), server_version_num);
            commands::check(config, expr.as_deref(), &server, reason.as_deref(), json)
        }
        Commands::Reason { keyword } => commands::reason(config, &keyword),
        Commands::Reasons { json } => commands::reasons(config, json),
        Commands::Marker => commands::marker(),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result =
        commands::load_config(cli.config.as_deref()).and_then(|config| run(cli.command, &config));

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
