//! CLI module for credgate
//!
//! Subcommands:
//! - `serve`: run the HTTP gateway (default mode)

pub mod serve;

use clap::{Parser, Subcommand};

/// credgate - key-authenticated gateway over the account record store
#[derive(Parser)]
#[command(name = "credgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP gateway
    Serve,
}
