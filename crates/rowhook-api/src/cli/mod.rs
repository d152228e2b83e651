//! CLI command definitions for the `rowhook` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod resource;
pub mod trigger;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Receive Baserow row change webhooks and manage their subscriptions.
#[derive(Parser)]
#[command(name = "rowhook", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the webhook receiver.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "5680")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Skip subscription checks for configured triggers at startup.
        #[arg(long)]
        no_activate: bool,
    },

    /// Register the webhook for a trigger unless it already exists.
    Activate {
        /// Trigger name from config.toml.
        trigger: String,
    },

    /// Remove the webhook for a trigger.
    Deactivate {
        /// Trigger name from config.toml.
        trigger: String,
    },

    /// Show the stored subscription state of triggers.
    Status {
        /// Limit output to one trigger.
        trigger: Option<String>,
    },

    /// List databases visible to the configured account.
    Databases,

    /// List the tables of a database.
    Tables {
        /// Database id (see `rowhook databases`).
        database_id: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
