use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::theme::ThemePreference;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "stagedeck";

pub const DEFAULT_TRANSITION: f32 = 1.2;
pub const DEFAULT_STAGGER: f32 = 0.1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// 1-indexed slide to open on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_slide: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windowed: Option<bool>,
}

/// Timing of slide transitions, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_transition")]
    pub transition: f32,

    #[serde(default = "default_stagger")]
    pub stagger: f32,
}

fn default_transition() -> f32 {
    DEFAULT_TRANSITION
}

fn default_stagger() -> f32 {
    DEFAULT_STAGGER
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            transition: DEFAULT_TRANSITION,
            stagger: DEFAULT_STAGGER,
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `stagedeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# stagedeck configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Configured default theme, ignoring values that don't parse.
    pub fn theme(&self) -> Option<ThemePreference> {
        self.defaults
            .as_ref()
            .and_then(|d| d.theme.as_deref())
            .and_then(|t| t.parse().ok())
    }

    pub fn animation(&self) -> AnimationConfig {
        self.animation.clone().unwrap_or_default()
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.theme" => {
                value
                    .parse::<ThemePreference>()
                    .map_err(|e| anyhow::anyhow!(e))?;
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "defaults.start_slide" => {
                let slide = match value.parse::<usize>() {
                    Ok(n) if n >= 1 => n,
                    _ => anyhow::bail!(
                        "Invalid start_slide: {value}. Must be a slide number (1-indexed)."
                    ),
                };
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .start_slide = Some(slide);
            }
            "defaults.windowed" => {
                let windowed = match value {
                    "true" => true,
                    "false" => false,
                    _ => anyhow::bail!("Invalid windowed: {value}. Must be 'true' or 'false'."),
                };
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .windowed = Some(windowed);
            }
            "animation.transition" | "animation.stagger" => {
                let seconds = match value.parse::<f32>() {
                    Ok(s) if s.is_finite() && (0.0..=10.0).contains(&s) => s,
                    _ => anyhow::bail!(
                        "Invalid duration: {value}. Must be a number of seconds between 0 and 10."
                    ),
                };
                let animation = self.animation.get_or_insert_with(AnimationConfig::default);
                if key == "animation.transition" {
                    animation.transition = seconds;
                } else {
                    animation.stagger = seconds;
                }
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.theme, defaults.start_slide, defaults.windowed, animation.transition, animation.stagger"
            ),
        }
        Ok(())
    }
}
