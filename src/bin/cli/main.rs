mod app;
mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vocabmaster-cli", about = "VocabMaster server and learning client", version)]
struct Cli {
    /// TOML config file shared by the server and the client
    #[arg(long, global = true, env = "VOCABMASTER_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve,

    /// Generate a new batch of words
    Generate {
        /// Level label, e.g. "B1-C1"
        #[arg(long)]
        level: Option<String>,
        /// Number of words (1-20)
        #[arg(long, short = 'n')]
        count: Option<u32>,
    },

    /// Show the last generated batch
    Words,

    /// Save a word from the last generated batch
    Save {
        /// Word to save (case-insensitive match against the batch)
        word: String,
    },

    /// Remove a saved word (exact match)
    Remove {
        word: String,
    },

    /// List saved words
    Saved,

    /// Review saved words
    Review {
        /// Show every saved word instead of a random few
        #[arg(long)]
        all: bool,
    },

    /// Remove every saved word
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Push pending changes and refresh saved words from the server
    Sync,

    /// Word history used to avoid repeats
    #[command(subcommand)]
    History(HistoryCommand),
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// Show the words currently excluded from generation
    Show,
    /// Forget the history and the last batch
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();
    let config = cli.config.as_deref();

    match cli.command {
        Command::Serve => {
            commands::serve::run(config).await?;
        }
        Command::Generate { level, count } => {
            let mut app = app::App::connect(config, level, count).await?;
            commands::generate::run(&mut app, &cli.format, use_color).await?;
        }
        Command::Words => {
            let app = app::App::open(config)?;
            commands::generate::show(&app, &cli.format, use_color)?;
        }
        Command::Save { word } => {
            let mut app = app::App::connect(config, None, None).await?;
            commands::saved::save(&mut app, &word, &cli.format, use_color).await?;
        }
        Command::Remove { word } => {
            let mut app = app::App::connect(config, None, None).await?;
            commands::saved::remove(&mut app, &word, &cli.format, use_color).await?;
        }
        Command::Saved => {
            let mut app = app::App::connect(config, None, None).await?;
            commands::saved::list(&mut app, &cli.format, use_color)?;
        }
        Command::Review { all } => {
            let mut app = app::App::connect(config, None, None).await?;
            commands::review::run(&mut app, all, &cli.format, use_color)?;
        }
        Command::Clear { yes } => {
            let mut app = app::App::connect(config, None, None).await?;
            commands::saved::clear(&mut app, yes, &cli.format, use_color).await?;
        }
        Command::Sync => {
            let mut app = app::App::open(config)?;
            commands::saved::sync(&mut app, &cli.format, use_color).await?;
        }
        Command::History(subcmd) => {
            let mut app = app::App::open(config)?;
            match subcmd {
                HistoryCommand::Show => commands::history::show(&app, &cli.format)?,
                HistoryCommand::Reset => {
                    commands::history::reset(&mut app, &cli.format, use_color)?
                }
            }
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

/// Check if stdin is a terminal (not piped)
fn stdin_is_tty() -> bool {
    unsafe { libc_isatty(0) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
