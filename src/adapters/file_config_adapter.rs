//! INI configuration for stocklens.
//!
//! Sections and keys are case-insensitive. Typed getters fall back to the
//! caller's default when a key is absent or its value does not parse; the
//! latter is logged so a typo in `pool_size` or `month_limit` is visible.

use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use configparser::ini::Ini;
use tracing::warn;

use crate::domain::error::StocklensError;
use crate::ports::config_port::ConfigPort;

#[derive(Debug)]
pub struct FileConfigAdapter {
    ini: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StocklensError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| StocklensError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { ini })
    }

    /// Parse INI text directly, as tests and embedded defaults do.
    pub fn from_string(content: &str) -> Result<Self, StocklensError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| StocklensError::ConfigParse {
                file: "<inline>".into(),
                reason,
            })?;
        Ok(Self { ini })
    }

    fn typed<T>(
        &self,
        section: &str,
        key: &str,
        default: T,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> T
    where
        T: Display,
    {
        let Some(raw) = self.ini.get(section, key) else {
            return default;
        };
        match parse(raw.trim()) {
            Some(value) => value,
            None => {
                warn!(section, key, value = %raw, %default, "unparsable config value, using default");
                default
            }
        }
    }

    fn number<T: FromStr + Display>(&self, section: &str, key: &str, default: T) -> T {
        self.typed(section, key, default, |raw| raw.parse().ok())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.number(section, key, default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.number(section, key, default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.typed(section, key, default, parse_bool)
    }
}
