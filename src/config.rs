use std::path::PathBuf;

use anyhow::{Context, Result};
use ::config::{Config, Environment};
use serde::Deserialize;

const ENV_PREFIX: &str = "JAVADOCSET";
const DEFAULT_BATCH_SIZE: i64 = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Rows buffered before the store writes them in one transaction.
    pub batch_size: usize,
    /// Directory that receives `<name>.docset`. Defaults to the working directory.
    pub output_dir: Option<PathBuf>,
    /// Show a progress bar while indexing.
    pub progress: bool,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let settings: Settings = Config::builder()
            .set_default("batch_size", DEFAULT_BATCH_SIZE)?
            .set_default("progress", true)?
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")?;
        Ok(settings.normalized())
    }

    fn normalized(mut self) -> Self {
        self.batch_size = self.batch_size.max(1);
        self
    }

    pub fn output_dir(&self) -> Result<PathBuf> {
        match &self.output_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to resolve working directory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_environment() {
        let s = Settings::load().unwrap();
        assert!(s.batch_size >= 1);
    }

    #[test]
    fn zero_batch_size_is_clamped() {
        let s = Settings {
            batch_size: 0,
            output_dir: None,
            progress: false,
        }
        .normalized();
        assert_eq!(s.batch_size, 1);
    }

    #[test]
    fn explicit_output_dir_wins() {
        let s = Settings {
            batch_size: 10,
            output_dir: Some(PathBuf::from("/tmp/out")),
            progress: false,
        };
        assert_eq!(s.output_dir().unwrap(), PathBuf::from("/tmp/out"));
    }
}
