use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::{AnimationConfig, Config};

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_from(&path).unwrap_or_default();
    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "  (not created yet, showing defaults)".dimmed());
    }
    println!();
    print!("{}", render(&config));
    Ok(())
}

/// Effective settings, one `key: value` line each.
fn render(config: &Config) -> String {
    let unset = || "(unset)".dimmed().to_string();
    let defaults = config.defaults.clone().unwrap_or_default();
    let animation: AnimationConfig = config.animation();

    let rows = [
        ("defaults.theme", defaults.theme.unwrap_or_else(unset)),
        (
            "defaults.start_slide",
            defaults
                .start_slide
                .map(|n| n.to_string())
                .unwrap_or_else(unset),
        ),
        (
            "defaults.windowed",
            defaults
                .windowed
                .map(|w| w.to_string())
                .unwrap_or_else(unset),
        ),
        ("animation.transition", format!("{}s", animation.transition)),
        ("animation.stagger", format!("{}s", animation.stagger)),
    ];
    rows.iter()
        .map(|(key, value)| format!("  {}: {value}\n", key.cyan()))
        .collect()
}

fn set(key: &str, value: &str) -> Result<()> {
    let path = Config::path()?;
    update(&path, key, value)?;
    println!("{} {key} = {value}", "Set".green().bold());
    println!("{}", format!("Saved to {}", path.display()).dimmed());
    Ok(())
}

/// Apply one `key = value` to the config at `path`. A missing file starts
/// from defaults; an unreadable or malformed one is an error and stays as is.
fn update(path: &Path, key: &str, value: &str) -> Result<Config> {
    let mut config = if path.exists() {
        Config::load_from(path)
            .with_context(|| format!("Refusing to overwrite {}", path.display()))?
    } else {
        Config::default()
    };
    config.set(key, value)?;
    config.save_to(path)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemePreference;

    #[test]
    fn test_render_lists_every_key() {
        colored::control::set_override(false);
        let mut config = Config::default();
        config.set("defaults.theme", "dark").unwrap();
        let out = render(&config);
        assert!(out.contains("defaults.theme: dark"));
        assert!(out.contains("defaults.start_slide: (unset)"));
        assert!(out.contains("animation.transition: 1.2s"));
        assert!(out.contains("animation.stagger: 0.1s"));
    }

    #[test]
    fn test_update_starts_from_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stagedeck").join("config.yaml");
        let config = update(&path, "defaults.theme", "dark").unwrap();
        assert_eq!(config.theme(), Some(ThemePreference::Dark));
        assert_eq!(Config::load_from(&path).unwrap().theme(), Some(ThemePreference::Dark));
    }

    #[test]
    fn test_update_keeps_existing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        update(&path, "animation.stagger", "0.3").unwrap();
        update(&path, "defaults.windowed", "true").unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.animation().stagger, 0.3);
        assert_eq!(loaded.defaults.unwrap().windowed, Some(true));
    }

    #[test]
    fn test_update_refuses_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let broken = "defaults: [not, a, map\n";
        std::fs::write(&path, broken).unwrap();
        assert!(update(&path, "defaults.theme", "dark").is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), broken);
    }
}
