use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// "0.3.2" for releases, "0.3.2@abc1234 2026-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "picstash", bin_name = "picstash", version = get_version())]
#[command(
    about = "Stage a picked file in the app cache, save it locally, and preview it",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log copy and provisioning details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pick a file and stage a copy of it in the cache
    #[command(alias = "p")]
    Pick {
        /// File to pick
        path: PathBuf,
    },

    /// Save the staged copy into local storage and preview it
    #[command(alias = "s")]
    Save,

    /// Open the saved copy in an external viewer
    #[command(alias = "v")]
    View,

    /// Pick, save and view in one go
    Run {
        /// File to pick
        path: PathBuf,
    },

    /// Show what is staged and saved
    #[command(alias = "st")]
    Status,

    /// Print the cache, local and data directories
    Paths,

    /// Remove cache files no longer referenced by the current state
    Clean,

    /// Get or set configuration
    Config {
        /// Configuration key (e.g., local-suffix)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pick_takes_a_path() {
        let cli = Cli::try_parse_from(["picstash", "-v", "pick", "a.png"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Pick { path }) => assert_eq!(path, PathBuf::from("a.png")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_config_key_and_value() {
        let cli = Cli::try_parse_from(["picstash", "config", "viewer", "feh"]).unwrap();
        match cli.command {
            Some(Commands::Config { key, value }) => {
                assert_eq!(key.as_deref(), Some("viewer"));
                assert_eq!(value.as_deref(), Some("feh"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
