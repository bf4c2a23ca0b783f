//! Shared helpers for commands: snapshot I/O, the engine and the clock.

use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use habitquest_core::{data_dir, Clock, EngineConfig, ProgressEngine, ProgressState};

pub type CliResult<T = ()> = Result<T, Box<dyn Error>>;

/// Global options shared by every command.
pub struct Context {
    pub state_path: Option<PathBuf>,
    pub date: Option<NaiveDate>,
}

impl Context {
    pub fn state_path(&self) -> CliResult<PathBuf> {
        match &self.state_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("state.json")),
        }
    }

    /// Loads the snapshot; a missing file is an empty state.
    pub fn load_state(&self) -> CliResult<ProgressState> {
        let path = self.state_path()?;
        load_state(&path)
    }

    pub fn save_state(&self, state: &ProgressState) -> CliResult {
        let path = self.state_path()?;
        save_state(&path, state)
    }

    /// The configured clock's current time, or noon of `--date`.
    pub fn now(&self, config: &EngineConfig) -> CliResult<DateTime<FixedOffset>> {
        let now = config.clock()?.now();
        match self.date {
            Some(date) => {
                let noon = date.and_hms_opt(12, 0, 0).ok_or("invalid --date")?;
                Ok(now
                    .offset()
                    .from_local_datetime(&noon)
                    .single()
                    .ok_or("invalid --date")?)
            }
            None => Ok(now),
        }
    }

    /// The day `--date` names, or today in the configured offset.
    pub fn today(&self, config: &EngineConfig) -> CliResult<NaiveDate> {
        Ok(self.now(config)?.date_naive())
    }
}

pub fn load_config() -> CliResult<EngineConfig> {
    Ok(EngineConfig::load()?)
}

pub fn load_engine(config: &EngineConfig) -> CliResult<ProgressEngine> {
    Ok(ProgressEngine::from_config(config)?)
}

pub fn load_state(path: &Path) -> CliResult<ProgressState> {
    match std::fs::read_to_string(path) {
        Ok(json) => Ok(ProgressState::from_json(&json)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ProgressState::new()),
        Err(e) => Err(format!("cannot read {}: {e}", path.display()).into()),
    }
}

pub fn save_state(path: &Path, state: &ProgressState) -> CliResult {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, state.to_json_pretty()?)?;
    tracing::debug!(path = %path.display(), "saved state snapshot");
    Ok(())
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
