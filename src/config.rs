use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs::home_dir;
use log::debug;
use serde::Deserialize;

const CONFIG_FILE: &str = ".spaus/config.json";
const DATA_ENV: &str = "SPAUS_DATA";
const DEFAULT_DATA_FILE: &str = "spaus_data.txt";

#[derive(Debug, Default, Deserialize)]
struct Config {
    data_file: Option<PathBuf>,
}

/// Resolve the backing file: `--file`, then `SPAUS_DATA` (also read from
/// `.env`), then `~/.spaus/config.json`, then `spaus_data.txt` in the cwd.
pub fn get_data_path(cli_path: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = cli_path {
        return Ok(path);
    }

    dotenv::dotenv().ok();
    let env_path = env::var(DATA_ENV).ok().filter(|v| !v.trim().is_empty());

    resolve(env_path, &get_config_path())
}

fn resolve(
    env_path: Option<String>,
    config_path: &Path,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = env_path {
        debug!("Using data file from {}", DATA_ENV);
        return Ok(PathBuf::from(path));
    }

    if config_path.exists() {
        let content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&content)?;

        if let Some(path) = config.data_file {
            debug!("Using data file from {}", config_path.display());
            return Ok(path);
        }
    }

    Ok(PathBuf::from(DEFAULT_DATA_FILE))
}

fn get_config_path() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(CONFIG_FILE)
}
