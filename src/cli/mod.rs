pub mod check;
pub mod init;
pub mod media;
pub mod migrate;
pub mod seed;
pub mod serve;
pub mod token;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aquarian")]
#[command(version)]
#[command(about = "Product catalog and portfolio backend with a built-in image library", long_about = None)]
pub struct Cli {
    #[arg(short, long, default_value = "aquarian.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a config file and data directory
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    Serve {
        #[arg(short = 'H', long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    Migrate {
        #[command(subcommand)]
        command: Option<MigrateCommand>,
    },
    /// Write the default settings record if none exists
    Seed,
    /// Check config, database, and admin token setup
    Check,
    Media {
        #[command(subcommand)]
        command: MediaCommand,
    },
    /// Print the config line for an admin token
    Token { raw: String },
}

#[derive(Subcommand)]
pub enum MigrateCommand {
    Status,
}

#[derive(Subcommand)]
pub enum MediaCommand {
    List {
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// Show which content references a media asset
    Refs { id: i64 },
    Delete { id: i64 },
}
