pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "platescout")]
#[command(about = "Compare restaurant menus and offers across delivery sites", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/platescout/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file (default: platescout.db in the user data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare menus and offers across the delivery sites
    Compare {
        /// File with one restaurant name per line (default: pipeline.restaurants)
        #[arg(short, long)]
        names: Option<PathBuf>,

        /// Print reconciled records without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Scrape map listings: contact details, hours and reviews
    Maps {
        /// File with one restaurant name per line (default: pipeline.restaurants)
        #[arg(short, long)]
        names: Option<PathBuf>,

        /// Also write the scraped records to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show a stored reconciled restaurant
    Show {
        /// Restaurant name, as it was compared
        name: String,
    },
    /// List stored restaurants and places
    List,
    /// Print the config file path
    Config,
}
