//! blockscope - inspect and clean up recorded UI block episodes
//!
//! This is the binary entry point. All logic lives in the library.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use blockscope::cli;
use blockscope_app::config::{default_config_path, load_settings_from};
use blockscope_core::prelude::*;
use blockscope_core::SortKey;

/// blockscope - inspect and clean up recorded UI block episodes
#[derive(Parser, Debug)]
#[command(name = "blockscope")]
#[command(about = "Inspect, sort and clean up UI block records", long_about = None)]
struct Args {
    /// Directory the block detector writes records into
    #[arg(short, long, global = true, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List records that pass the inclusion policy
    List {
        /// Order by `cost` or `recency`
        #[arg(long)]
        sort: Option<SortKey>,
    },

    /// Print one record in full
    Show {
        /// Start time of the episode, as listed
        start_time: String,
    },

    /// Delete one record
    Remove { start_time: String },

    /// Delete every record in the directory
    Clear,

    /// Export a record's summary (or its raw file with --stack-dump)
    Share {
        start_time: String,

        #[arg(long)]
        stack_dump: bool,

        /// Export directory
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Keep the list open and print events as NDJSON
    Watch,

    /// Write a default config file
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install().map_err(|e| Error::config(e.to_string()))?;

    let args = Args::parse();

    if let Err(e) = blockscope_core::logging::init() {
        eprintln!("Logging disabled: {}", e);
    }

    let config_path = args.config.unwrap_or_else(default_config_path);

    if let Command::InitConfig = args.command {
        return cli::init_config(&config_path, &mut io::stdout()).map(|_| ());
    }

    let settings = load_settings_from(&config_path);
    let dir = cli::resolve_record_dir(args.dir, &settings)?;
    let mut out = io::stdout();

    let result = match args.command {
        Command::List { sort } => cli::list(settings, &dir, sort, &mut out).await.map(|_| ()),
        Command::Show { start_time } => cli::show(settings, &dir, &start_time, &mut out).await,
        Command::Remove { start_time } => cli::remove(settings, &dir, &start_time, &mut out).await,
        Command::Clear => cli::clear(settings, &dir, &mut out).await.map(|_| ()),
        Command::Share {
            start_time,
            stack_dump,
            out: out_dir,
        } => cli::share(settings, &dir, &start_time, stack_dump, out_dir, &mut out)
            .await
            .map(|_| ()),
        Command::Watch => blockscope::run_headless(settings, &dir).await,
        Command::InitConfig => Ok(()),
    };

    if let Err(ref e) = result {
        error!("Command failed: {:?}", e);
    }
    result
}
