use std::fs;
use std::path::{Path, PathBuf};
use dotenv::var;
use liquid_crystal_i2c::CharSize;
use log::warn;
use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
pub enum Font {
    #[serde(rename = "5x8")]
    Dots5x8,
    #[serde(rename = "5x10")]
    Dots5x10,
}

impl From<Font> for CharSize {
    fn from(font: Font) -> Self {
        match font {
            Font::Dots5x8 => CharSize::Dots5x8,
            Font::Dots5x10 => CharSize::Dots5x10,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// I2C device node, e.g. `/dev/i2c-1`.
    pub bus: String,
    pub address: u8,
    pub columns: u8,
    pub rows: u8,
    pub font: Font,
}

impl Config {
    /// Path from `CONFIG_FILE`, falling back to `config.json` in the working directory.
    pub fn path() -> PathBuf {
        var("CONFIG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.json"))
    }

    pub fn try_load() -> Option<Self> {
        Self::load_from(&Self::path())
    }

    /// Reads a config file. A missing or malformed file yields `None`.
    pub fn load_from(path: &Path) -> Option<Self> {
        let json = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&json) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring unreadable config {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self) -> eyre::Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> eyre::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Applies `LCD_I2C_BUS` and `LCD_I2C_ADDRESS` from the environment, if set.
    pub fn with_env_overrides(mut self) -> eyre::Result<Self> {
        if let Ok(bus) = var("LCD_I2C_BUS") {
            self.bus = bus;
        }
        if let Ok(address) = var("LCD_I2C_ADDRESS") {
            self.address = parse_address(&address)?;
        }
        Ok(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bus: "/dev/i2c-1".to_string(),
            address: 0x27,
            columns: 16,
            rows: 2,
            font: Font::Dots5x8,
        }
    }
}

/// Parses a 7-bit I2C address, either decimal or `0x`-prefixed hex.
pub fn parse_address(s: &str) -> eyre::Result<u8> {
    let s = s.trim();
    let address = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16)?,
        None => s.parse()?,
    };
    if address > 0x7F {
        return Err(eyre::eyre!("I2C address {:#04x} is not a 7-bit address", address));
    }
    Ok(address)
}
