use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "reqk")]
#[command(about = "Equipment requisition catalog CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> site -> local...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Fetch the filtered, deduplicated user directory and print it as JSON
    Directory {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Fail instead of warning when the config carries unknown keys
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// Fetch directory + catalogs, build item aggregates and print them as JSON
    Catalog {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Fail instead of warning when the config carries unknown keys
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// Assemble a submission payload from a saved form state
    Assemble {
        /// Path to the form state JSON (header, rows, approvals, criteria)
        #[arg(long)]
        state: String,

        /// Validate as a submission instead of saving a draft
        #[arg(long, default_value_t = false)]
        submit: bool,

        /// Layered config paths; supplies approval stage names when the
        /// state carries no sign-off chain
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Fail instead of warning when the config carries unknown keys
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = reqk_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Directory {
            config_paths,
            strict,
        } => {
            commands::fetch::run_directory(&config_paths, strict).await?;
        }

        Commands::Catalog {
            config_paths,
            strict,
        } => {
            commands::fetch::run_catalog(&config_paths, strict).await?;
        }

        Commands::Assemble {
            state,
            submit,
            config_paths,
            strict,
        } => {
            return commands::assemble::run_assemble(&state, submit, &config_paths, strict);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
