use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use paraulogic_core::{LetterSet, LoadMode, Query, WordIndex, parse_required, solve};

#[derive(Parser)]
#[command(name = "paraulogic")]
#[command(about = "Solve the Paraulògic letter puzzle from a dictionary file")]
struct Cli {
    /// Dictionary JSON (`{"words": [[...], ...]}`).
    #[arg(long, short, global = true, env = "DICTIONARY_PATH", default_value = "data/words_v2.json")]
    dictionary: PathBuf,
    #[arg(long, global = true, value_enum, default_value_t = Mode::Mmap)]
    mode: Mode,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every word for a puzzle.
    Solve {
        /// Ring letters, e.g. `aceilst`.
        #[arg(long, short)]
        letters: String,
        /// Center letter every word must contain.
        #[arg(long, short)]
        required: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print index statistics.
    Stats {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Mmap,
    Owned,
}

impl From<Mode> for LoadMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mmap => LoadMode::Mmap,
            Mode::Owned => LoadMode::Owned,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let start = Instant::now();
    let index = WordIndex::build_from_file_with_mode(&cli.dictionary, cli.mode.into())
        .with_context(|| format!("load dictionary {}", cli.dictionary.display()))?;
    info!("index built in {} ms", start.elapsed().as_millis());

    match cli.command {
        Commands::Solve {
            letters,
            required,
            json,
        } => {
            let required = parse_required(&required).context("invalid --required")?;
            let mut allowed: LetterSet = letters.parse().context("invalid --letters")?;
            allowed.insert(required);
            let solution = solve(&index, &Query::new(allowed, Some(required)));
            if json {
                println!("{}", serde_json::to_string_pretty(&solution)?);
            } else {
                for line in solution.display_lines() {
                    println!("{line}");
                }
                info!("{} words", solution.len());
            }
        }
        Commands::Stats { json } => {
            let stats = index.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("words:      {}", stats.words);
                println!("characters: {}", stats.characters);
                println!("affixes:    {}", stats.affixes);
                for (c, count) in stats.buckets {
                    println!("  {c}: {count}");
                }
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::WARN);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(max_level)
        .init();
}
