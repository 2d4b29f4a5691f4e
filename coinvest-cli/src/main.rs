use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use coinvest_finance::{IngestOptions, ingest, update_todate_columns};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(name = "coinvest", version, about = "Household co-investment ledger tools")]
struct Cli {
    /// Config file (default: ~/.coinvest/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge newly reported contributions into a grid-table ledger
    Ingest {
        /// Existing ledger (grid-table text)
        #[arg(long)]
        ledger: PathBuf,

        /// New contribution notes ("YYYY-MM-DD. <amount>k | <person>" blocks)
        #[arg(long)]
        new: Option<PathBuf>,

        /// Replay the whole history instead of trusting the last running totals
        #[arg(long)]
        rebuild: bool,

        /// Maximum column width before wrapping (default from config: 30)
        #[arg(long)]
        max_width: Option<usize>,

        /// Write the updated ledger here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Overwrite the ledger file
        #[arg(long, conflicts_with = "output")]
        in_place: bool,
    },

    /// Recompute running to-date columns of an expenses CSV
    Expenses {
        #[arg(long)]
        csv: PathBuf,

        /// Write the updated CSV here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config_file = cli.config.as_deref();

    match cli.command {
        Command::Ingest {
            ledger,
            new,
            rebuild,
            max_width,
            output,
            in_place,
        } => {
            let cfg = config::load_config(config_file)?;
            let options = IngestOptions {
                rebuild_from_scratch: rebuild || cfg.ingest.rebuild_from_scratch,
                max_cell_width: max_width.unwrap_or(cfg.table.max_cell_width),
            };
            if options.max_cell_width == 0 {
                bail!("--max-width must be at least 1");
            }

            let existing = state::read_text(&ledger)?;
            let contributions = match &new {
                Some(p) => state::read_text(p)?,
                None => String::new(),
            };

            let updated = ingest(&existing, &contributions, options)
                .with_context(|| format!("ingesting into {}", ledger.display()))?;

            let target = if in_place { Some(ledger) } else { output };
            emit(target, &updated)?;
        }

        Command::Expenses { csv, output } => {
            let text = state::read_text(&csv)?;
            let updated = update_todate_columns(&text)
                .with_context(|| format!("updating {}", csv.display()))?;
            emit(output, &updated)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(config_file)?,
            ConfigCommand::Show => {
                let cfg = config::load_config(config_file)?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn emit(target: Option<PathBuf>, text: &str) -> Result<()> {
    match target {
        Some(path) => {
            state::write_text(&path, text)?;
            info!(path = %path.display(), "wrote output");
        }
        None => println!("{}", text.trim_end_matches('\n')),
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,coinvest_cli=info,coinvest_finance=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
