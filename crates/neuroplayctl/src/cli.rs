//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap. Keeps argument parsing separate
//! from execution logic.

use clap::{Parser, Subcommand};

/// NeuroPlay pipeline CLI
#[derive(Parser)]
#[command(name = "neuroplayctl")]
#[command(about = "NeuroPlay - game completion pipeline client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Daemon base URL (overrides the default)
    #[arg(long, global = true, default_value = "http://127.0.0.1:8430")]
    pub addr: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a completed game session for processing
    Submit {
        /// Student id
        #[arg(long)]
        student: i64,

        /// Game type (cyber_runner | echo_temple | sonic_jump | gravity_lab)
        #[arg(long)]
        game: String,

        /// Final score
        #[arg(long)]
        score: u32,

        /// Session duration in seconds
        #[arg(long)]
        duration: u32,

        /// Accuracy, 0.0 to 1.0
        #[arg(long)]
        accuracy: f64,

        /// Whether the game was completed
        #[arg(long)]
        completed: bool,

        /// Session id (generated if omitted)
        #[arg(long)]
        session: Option<String>,

        /// Poll until the result is available
        #[arg(long)]
        wait: bool,
    },

    /// Poll the status of a submitted job
    Status {
        /// Job id returned by submit
        job_id: String,

        /// Output raw JSON only
        #[arg(long)]
        json: bool,
    },

    /// Register a student with the daemon
    Register {
        /// Student id
        student_id: i64,

        /// Starting XP
        #[arg(long, default_value_t = 0)]
        xp: u64,

        /// Current daily streak
        #[arg(long, default_value_t = 0)]
        streak: u32,
    },

    /// Show daemon health
    Health,
}
