use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "stashcast")]
#[command(about = "Keep a folder of audio from subscribed feeds, within age and size limits", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: .stashcast.toml in the media directory)
    #[arg(long, global = true, env = "STASHCAST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Media directory, overriding `media.dir` from the configuration
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch feeds, download new items, then apply the retention limits (default)
    Run(RunArgs),
    /// Run repeatedly on a jittered timer until interrupted
    Watch {
        /// Do not apply retention limits after each run
        #[arg(long)]
        no_retention: bool,
    },
    /// Apply the retention limits only
    Prune {
        /// Report what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the feed URL of every subscription
    Feeds,
}

#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Report what would be downloaded and deleted without doing it
    #[arg(long)]
    pub dry_run: bool,
    /// Do not apply retention limits after downloading
    #[arg(long)]
    pub no_retention: bool,
    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}
