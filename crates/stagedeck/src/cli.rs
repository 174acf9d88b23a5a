use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::deck::Deck;

#[derive(Parser)]
#[command(name = "stagedeck")]
#[command(author, version, about)]
#[command(long_about = "An animated slide presenter.\n\n\
    Describe your slides in YAML and present them with smooth 3D transitions.\n\n\
    Examples:\n  \
    stagedeck talk.yaml              Launch presentation (fullscreen)\n  \
    stagedeck talk.yaml --windowed   Launch in a window\n  \
    stagedeck demo                   Present the built-in demo deck")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Deck file to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start on a specific slide (1-indexed)
    #[arg(long, global = false)]
    pub slide: Option<usize>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Present the built-in demo deck
    Demo {
        /// Launch in a window instead of fullscreen
        #[arg(long)]
        windowed: bool,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, animation.transition)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    /// Log filter directive implied by the verbosity flags.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Demo { windowed }) => {
                crate::app::run(Deck::demo()?, windowed || self.windowed, None)
            }
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("stagedeck {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                    let deck = Deck::load(&file)?;
                    crate::app::run(deck, self.windowed, self.slide)
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_level_from_flags() {
        let cli = Cli::parse_from(["stagedeck"]);
        assert_eq!(cli.log_level(), "warn");
        let cli = Cli::parse_from(["stagedeck", "-vv"]);
        assert_eq!(cli.log_level(), "trace");
        let cli = Cli::parse_from(["stagedeck", "-v", "--quiet"]);
        assert_eq!(cli.log_level(), "error");
    }

    #[test]
    fn test_file_and_slide() {
        let cli = Cli::parse_from(["stagedeck", "talk.yaml", "--slide", "3", "--windowed"]);
        assert_eq!(cli.file, Some(PathBuf::from("talk.yaml")));
        assert_eq!(cli.slide, Some(3));
        assert!(cli.windowed);
    }

    #[test]
    fn test_config_set_subcommand() {
        let cli = Cli::parse_from(["stagedeck", "config", "set", "defaults.theme", "dark"]);
        match cli.command {
            Some(Commands::Config {
                command: ConfigCommands::Set { key, value },
            }) => {
                assert_eq!(key, "defaults.theme");
                assert_eq!(value, "dark");
            }
            _ => panic!("expected config set"),
        }
    }
}
