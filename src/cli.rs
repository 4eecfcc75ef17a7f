use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Mirror your Letterboxd diary and watchlist into a local SQLite table.
#[derive(Debug, Parser)]
#[command(version, about)]
pub(crate) struct Cli {
    /// TOML config file (defaults to config.toml in the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// SQLite database to write to, overriding the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,
    /// Go through every step but leave the database untouched
    #[arg(long, global = true)]
    pub dry_run: bool,
    /// More logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub(crate) enum Command {
    /// Sign in through a headless browser, download the export and sync it
    Sync,
    /// Sync from an export archive that was already downloaded
    Import {
        /// The export zip, as downloaded from the Letterboxd settings page
        archive: PathBuf,
    },
    /// Show how many films of each status are stored
    Status,
}

impl Cli {
    pub fn effective_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Sync)
    }

    /// Default log filter, used when `RUST_LOG` isn't set.
    pub fn log_filter(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "filmsync=debug,filmsync_archive=debug,filmsync_records=debug,filmsync_session=debug,filmsync_store=debug,info",
            (false, _) => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["filmsync"], "info")]
    #[case(&["filmsync", "-q"], "warn")]
    #[case(&["filmsync", "status", "-vv"], "trace")]
    #[case(
        &["filmsync", "-v"],
        "filmsync=debug,filmsync_archive=debug,filmsync_records=debug,filmsync_session=debug,filmsync_store=debug,info"
    )]
    fn test_log_filter(#[case] args: &[&str], #[case] expected: &str) {
        assert_eq!(Cli::parse_from(args).log_filter(), expected);
    }

    #[test]
    fn test_default_command_is_sync() {
        let cli = Cli::parse_from(["filmsync", "--dry-run"]);
        assert!(matches!(cli.effective_command(), Command::Sync));
        assert!(cli.dry_run);
        let cli = Cli::parse_from(["filmsync", "import", "export.zip", "--database", "films.sqlite"]);
        assert!(matches!(cli.effective_command(), Command::Import { archive } if archive == PathBuf::from("export.zip")));
        assert_eq!(cli.database, Some(PathBuf::from("films.sqlite")));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["filmsync", "-v", "-q"]).is_err());
    }
}
