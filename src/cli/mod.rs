//! Command-line interface for fleetgate.

use clap::{Parser, Subcommand};

/// fleetgate - sessions and router-scoped access for the fleet dashboard
#[derive(Parser)]
#[command(name = "fleetgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server and the session sweeper (default)
    Serve,

    /// Create a user account
    CreateUser {
        /// Login name (case-sensitive)
        username: String,

        /// Role: admin or guest
        #[arg(long, default_value = "guest")]
        role: String,

        /// Initial password
        #[arg(long)]
        password: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        full_name: Option<String>,
    },

    /// Delete expired sessions once and exit
    SweepSessions,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}
