use crate::config::Config;
use crate::errors::{AppError, AppResult};
use std::fs;
use std::path::Path;

pub struct ConfigLogic;

impl ConfigLogic {
    pub fn print(cfg: &Config) -> AppResult<()> {
        println!("{}", cfg.to_yaml()?);
        Ok(())
    }

    /// Keys missing from the configuration file at `path`.
    pub fn check(path: &Path) -> AppResult<Vec<&'static str>> {
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        Config::missing_keys(&content)
    }
}
