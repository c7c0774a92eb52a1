mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "swap-guard")]
#[command(about = "Audit and simulate the swap-request confirmation guard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Guard config (TOML). Defaults to the stock `delete_swap` guard.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the links of an HTML page that would get a confirmation prompt
    Scan {
        /// Rendered HTML page
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Click a link of an HTML page with a scripted answer
    Simulate {
        /// Rendered HTML page
        file: PathBuf,

        /// Position of the link among all `<a>` elements, starting at 0
        #[arg(long)]
        click: usize,

        /// What the user answers if asked
        #[arg(long, value_enum, default_value = "no")]
        answer: Answer,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn confirmed(self) -> bool {
        matches!(self, Answer::Yes)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan { file, json } => {
            commands::scan::run(&file, &config, json)?;
        }

        Commands::Simulate {
            file,
            click,
            answer,
            json,
        } => {
            commands::simulate::run(&file, &config, click, answer, json)?;
        }
    }

    Ok(())
}
