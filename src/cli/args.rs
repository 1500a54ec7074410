use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for provider-ci
#[derive(Parser, Debug, Clone)]
#[command(name = "provider-ci")]
#[command(about = "Bring a generated provider repository up to date with the current templates")]
#[command(long_about = None)]
#[command(version)]
pub struct Args {
    /// Increase logging output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Default log filter for the requested verbosity
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run every post-generation migration against a repository
    Migrate(RepoArgs),

    /// Show which migrations would run for a template
    ListMigrations(RepoArgs),
}

/// Location of the repository and the template it was generated from
#[derive(ClapArgs, Debug, Clone)]
pub struct RepoArgs {
    /// Repository checkout to migrate
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out: PathBuf,

    /// Template name, overriding the configuration file
    #[arg(long, value_name = "NAME", env = "PROVIDER_CI_TEMPLATE")]
    pub template: Option<String>,

    /// Configuration file path, relative to the repository when not absolute
    #[arg(long, value_name = "PATH", default_value = crate::config::CI_MGMT_FILE)]
    pub config: PathBuf,
}

impl RepoArgs {
    /// Configuration path resolved against `out`
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.out.join(&self.config)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn verbosity_counts() {
        let args = Args::try_parse_from(["provider-ci", "-vv", "migrate"]).unwrap();
        assert_eq!(args.log_level(), "trace");

        let args = Args::try_parse_from(["provider-ci", "list-migrations"]).unwrap();
        assert_eq!(args.log_level(), "info");
    }

    #[test]
    fn config_is_relative_to_out() {
        let args =
            Args::try_parse_from(["provider-ci", "migrate", "--out", "/work/repo"]).unwrap();
        let Command::Migrate(repo) = args.command else {
            panic!("expected migrate");
        };

        assert_eq!(repo.config_path(), Path::new("/work/repo/.ci-mgmt.yaml"));

        let args = Args::try_parse_from([
            "provider-ci",
            "migrate",
            "--out",
            "/work/repo",
            "--config",
            "/etc/ci.yaml",
        ])
        .unwrap();
        let Command::Migrate(repo) = args.command else {
            panic!("expected migrate");
        };
        assert_eq!(repo.config_path(), Path::new("/etc/ci.yaml"));
    }
}
