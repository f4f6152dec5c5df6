// src/cli/mod.rs — CLI definition (clap derive)

pub mod progress;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::types::Plan;

#[derive(Parser, Debug)]
#[command(
    name = "redraft",
    about = "Score an essay on clarity, analysis and language, then rewrite it until it clears the bar",
    version
)]
pub struct Cli {
    /// Essay file to evaluate
    pub essay: Option<PathBuf>,

    /// Read the essay from stdin
    #[arg(long, conflicts_with = "essay")]
    pub stdin: bool,

    /// Subscription plan: free, basic or premium
    #[arg(short, long, default_value = "free")]
    pub plan: Plan,

    /// Override the plan's quality threshold (0-10)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Override the plan's revision cap (0-10)
    #[arg(short = 'n', long)]
    pub max_iterations: Option<u32>,

    /// Also write the final essay to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the full report as JSON instead of the essay
    #[arg(long)]
    pub json: bool,

    /// Suppress progress output (only emit the final result)
    #[arg(long)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Model id, overriding the configured one
    #[arg(short, long)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the evaluation loop over HTTP
    Serve {
        /// Port to listen on (defaults to [api] port)
        #[arg(long)]
        port: Option<u16>,
    },
}
