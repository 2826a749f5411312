use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unknown setting: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Per-machine settings stored next to the mapping profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    pub web_port: u16,
    pub controller_port: u16,
    pub adb_path: String,
    pub vertical_screen_height: u32,
    pub horizontal_screen_width: u32,
    pub vertical_position: (i32, i32),
    pub horizontal_position: (i32, i32),
    pub active_mapping_file: String,
    pub mapping_label_opacity: f32,
    pub language: String,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            web_port: 27799,
            controller_port: 27798,
            adb_path: "adb".to_string(),
            vertical_screen_height: 1280,
            horizontal_screen_width: 720,
            vertical_position: (300, 300),
            horizontal_position: (300, 300),
            active_mapping_file: "default.json".to_string(),
            mapping_label_opacity: 0.3,
            language: "en-US".to_string(),
        }
    }
}

pub const SETTING_KEYS: &[&str] = &[
    "web_port",
    "controller_port",
    "adb_path",
    "vertical_screen_height",
    "horizontal_screen_width",
    "vertical_position",
    "horizontal_position",
    "active_mapping_file",
    "mapping_label_opacity",
    "language",
];

fn parse<T>(key: &'static str, value: &str) -> Result<T, SettingsError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| SettingsError::InvalidValue {
            key,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_pair(key: &'static str, value: &str) -> Result<(i32, i32), SettingsError> {
    let Some((x, y)) = value.split_once(',') else {
        return Err(SettingsError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected `x,y`".to_string(),
        });
    };
    Ok((parse(key, x)?, parse(key, y)?))
}

impl LocalSettings {
    /// Read settings, falling back to defaults when the file is missing.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn parse(input: &str) -> Result<Self, SettingsError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Current value of `key` as text.
    pub fn get(&self, key: &str) -> Result<String, SettingsError> {
        let pair = |(x, y): (i32, i32)| format!("{x},{y}");
        Ok(match key {
            "web_port" => self.web_port.to_string(),
            "controller_port" => self.controller_port.to_string(),
            "adb_path" => self.adb_path.clone(),
            "vertical_screen_height" => self.vertical_screen_height.to_string(),
            "horizontal_screen_width" => self.horizontal_screen_width.to_string(),
            "vertical_position" => pair(self.vertical_position),
            "horizontal_position" => pair(self.horizontal_position),
            "active_mapping_file" => self.active_mapping_file.clone(),
            "mapping_label_opacity" => self.mapping_label_opacity.to_string(),
            "language" => self.language.clone(),
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        })
    }

    /// Set `key` from text, parsing it as the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        match key {
            "web_port" => self.web_port = parse("web_port", value)?,
            "controller_port" => self.controller_port = parse("controller_port", value)?,
            "adb_path" => self.adb_path = value.to_string(),
            "vertical_screen_height" => {
                self.vertical_screen_height = parse("vertical_screen_height", value)?;
            }
            "horizontal_screen_width" => {
                self.horizontal_screen_width = parse("horizontal_screen_width", value)?;
            }
            "vertical_position" => {
                self.vertical_position = parse_pair("vertical_position", value)?;
            }
            "horizontal_position" => {
                self.horizontal_position = parse_pair("horizontal_position", value)?;
            }
            "active_mapping_file" => self.active_mapping_file = value.to_string(),
            "mapping_label_opacity" => {
                let opacity: f32 = parse("mapping_label_opacity", value)?;
                if !(0.0..=1.0).contains(&opacity) {
                    return Err(SettingsError::InvalidValue {
                        key: "mapping_label_opacity",
                        value: value.to_string(),
                        reason: "must be between 0 and 1".to_string(),
                    });
                }
                self.mapping_label_opacity = opacity;
            }
            "language" => self.language = value.to_string(),
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}
