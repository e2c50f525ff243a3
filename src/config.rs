use std::path::{Path, PathBuf};

pub const DEFAULT_SEED: u64 = 0x5eed;
pub const DEFAULT_TICKS: u32 = 30;

#[derive(Debug)]
pub struct AppConfig {
    pub root: PathBuf,
    pub seed: u64,
    pub ticks: u32,
}

impl AppConfig {
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        if args.len() < 2 {
            return Err("usage: npcgen <table-root> [seed] [ticks]".to_string());
        }

        let root = Path::new(&args[1]).to_path_buf();
        let seed = match args.get(2) {
            Some(value) => parse_number("seed", value)?,
            None => env_number("NPCGEN_SEED")?.unwrap_or(DEFAULT_SEED),
        };
        let ticks = match args.get(3) {
            Some(value) => parse_number("ticks", value)?,
            None => env_number("NPCGEN_TICKS")?.unwrap_or(DEFAULT_TICKS),
        };
        Ok(Self { root, seed, ticks })
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>, String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => parse_number(name, &value).map(Some),
        _ => Ok(None),
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| format!("invalid {} '{}'", name, value))
}
