use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::warehouse::parse_expansion;

#[derive(Parser, Debug)]
#[command(name = "wow-static-extract")]
#[command(version, about = "Extract WoW client table exports into per-entity JSON bundles")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract classes, specs, instances, spells, items and difficulties
    Extract {
        /// Directory containing the client CSV exports and listfile.csv
        #[arg(long, env = "WOW_EXTRACT_DATA")]
        data: PathBuf,

        /// Directory containing rendered interface assets
        #[arg(long, env = "WOW_EXTRACT_INTERFACE")]
        interface: PathBuf,

        /// Output directory
        #[arg(long, env = "WOW_EXTRACT_OUTPUT")]
        output: PathBuf,

        /// Only extract these entity kinds (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        include: Option<Vec<String>>,

        /// Skip these entity kinds (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,

        /// Rewrite documents and images that already exist
        #[arg(long)]
        overwrite: bool,

        /// Run the extractors concurrently
        #[arg(short, long)]
        parallel: bool,
    },

    /// Write arena, dungeon, raid and encounter lists for the warehouse
    Warehouse {
        /// Directory containing map.csv and dungeonencounter.csv
        #[arg(long, env = "WOW_EXTRACT_DATA")]
        data: PathBuf,

        /// Output directory
        #[arg(long, env = "WOW_EXTRACT_OUTPUT")]
        output: PathBuf,

        /// Expansions to include as ID=LABEL (repeatable, default 8=Shadowlands)
        #[arg(long = "expansion", value_parser = parse_expansion)]
        expansions: Vec<(i64, String)>,
    },

    /// Upsert connected realm topology into a SQLite database
    SyncRealms {
        /// Directory with one subdirectory of realm JSON files per region
        #[arg(long, env = "WOW_EXTRACT_REALMS")]
        realms: PathBuf,

        /// SQLite database path
        #[arg(long, env = "WOW_EXTRACT_DB")]
        db: PathBuf,
    },

    /// List entity kinds and the output categories they write
    ListEntities,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
