//! Server settings from command-line flags and environment variables.
//!
//! Flags win over the environment; anything unset or unparsable falls back
//! to its default, except `RATE_LIMIT_HEADER`, which must be a valid header.

use std::path::PathBuf;

use anyhow::Context;
use axum::http::HeaderName;

use paraulogic_core::LoadMode;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_DICTIONARY: &str = "data/words_v2.json";
pub const MAX_PAGE_SIZE: usize = 500;
pub const DEFAULT_RATE_LIMIT_RPS: u32 = 5;
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 10;
pub const DEFAULT_RATE_LIMIT_HEADER: &str = "fly-client-ip";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub dictionary_path: PathBuf,
    pub load_mode: LoadMode,
    pub disable_cache: bool,
    pub rate_limit_rps: u32,
    pub rate_limit_burst: u32,
    pub rate_limit_header: HeaderName,
}

#[derive(Debug, Default)]
struct Flags {
    disable_cache: bool,
    dictionary: Option<PathBuf>,
    load_mode: Option<LoadMode>,
}

impl Flags {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Self {
        let mut flags = Flags::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--no-cache" => flags.disable_cache = true,
                "--dictionary" => flags.dictionary = args.next().map(PathBuf::from),
                _ => {
                    if let Some(path) = arg.strip_prefix("--dictionary=") {
                        flags.dictionary = Some(PathBuf::from(path));
                    } else if let Some(mode) = arg.strip_prefix("--load-mode=") {
                        flags.load_mode = LoadMode::parse(mode);
                    }
                }
            }
        }
        flags
    }
}

impl Config {
    /// Read the process arguments and environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_sources(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// `args` excludes the program name; `var` looks up an environment
    /// variable.
    pub fn from_sources<I, F>(args: I, var: F) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let flags = Flags::parse(args);
        let positive = |key: &str, default: u32| {
            var(key)
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        let raw_header =
            var("RATE_LIMIT_HEADER").unwrap_or_else(|| DEFAULT_RATE_LIMIT_HEADER.to_string());
        let rate_limit_header = HeaderName::try_from(raw_header.to_ascii_lowercase())
            .with_context(|| format!("invalid RATE_LIMIT_HEADER {raw_header:?}"))?;

        Ok(Config {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: var("PORT")
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            dictionary_path: flags
                .dictionary
                .or_else(|| var("DICTIONARY_PATH").map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DICTIONARY)),
            load_mode: flags
                .load_mode
                .or_else(|| var("DICTIONARY_LOAD_MODE").as_deref().and_then(LoadMode::parse))
                .unwrap_or_default(),
            disable_cache: flags.disable_cache,
            rate_limit_rps: positive("RATE_LIMIT_RPS", DEFAULT_RATE_LIMIT_RPS),
            rate_limit_burst: positive("RATE_LIMIT_BURST", DEFAULT_RATE_LIMIT_BURST),
            rate_limit_header,
        })
    }
}
